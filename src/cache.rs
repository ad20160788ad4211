use std::{collections::HashSet, sync::Arc, time::Duration};

use dashmap::DashMap;
use redis::{AsyncCommands, aio::ConnectionManager};
use tokio::time::Instant;
use tracing::{debug, warn};

pub const MOVIES_TAG: &str = "movies";
const KEY_PREFIX: &str = "movies-api:output:";

/// Response cache with tag-based eviction. Backend errors are logged and treated as misses.
#[derive(Clone)]
pub enum OutputCache {
    Redis(RedisOutputCache),
    Memory(MemoryOutputCache),
}

impl OutputCache {
    pub async fn connect(redis_url: Option<&str>, ttl: Duration) -> anyhow::Result<Self> {
        match redis_url {
            Some(url) => {
                let client = redis::Client::open(url)?;
                let conn = ConnectionManager::new(client).await?;
                tracing::info!("output cache backed by redis");
                Ok(Self::Redis(RedisOutputCache { conn, ttl }))
            },
            None => {
                tracing::info!("output cache backed by in-process store");
                Ok(Self::memory(ttl))
            },
        }
    }

    pub fn memory(ttl: Duration) -> Self {
        Self::Memory(MemoryOutputCache::new(ttl))
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let hit = match self {
            Self::Redis(cache) => cache.get(key).await,
            Self::Memory(cache) => cache.get(key),
        };
        debug!(key, hit = hit.is_some(), "output cache lookup");
        hit
    }

    pub async fn set(&self, key: &str, tags: &[&str], body: Vec<u8>) {
        match self {
            Self::Redis(cache) => cache.set(key, tags, body).await,
            Self::Memory(cache) => cache.set(key, tags, body),
        }
    }

    pub async fn evict_by_tag(&self, tag: &str) {
        match self {
            Self::Redis(cache) => cache.evict_by_tag(tag).await,
            Self::Memory(cache) => cache.evict_by_tag(tag),
        }
        debug!(tag, "output cache evicted");
    }
}

#[derive(Clone)]
pub struct RedisOutputCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisOutputCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<Option<Vec<u8>>> = conn.get(entry_key(key)).await;
        result.unwrap_or_else(|err| {
            warn!(key, error = %err, "failed to read cached response");
            None
        })
    }

    async fn set(&self, key: &str, tags: &[&str], body: Vec<u8>) {
        let mut conn = self.conn.clone();
        let entry = entry_key(key);
        let secs = self.ttl.as_secs().max(1);

        let result: redis::RedisResult<()> = async {
            let _: () = conn.set_ex(&entry, body, secs).await?;
            for tag in tags {
                let tag_key = tag_key(tag);
                let _: () = conn.sadd(&tag_key, &entry).await?;
                let _: () = conn.expire(&tag_key, secs as i64).await?;
            }
            Ok(())
        }
        .await;

        if let Err(err) = result {
            warn!(key, error = %err, "failed to store cached response");
        }
    }

    async fn evict_by_tag(&self, tag: &str) {
        let mut conn = self.conn.clone();
        let tag_key = tag_key(tag);

        let result: redis::RedisResult<()> = async {
            let members: Vec<String> = conn.smembers(&tag_key).await?;
            if !members.is_empty() {
                let _: () = conn.del(&members).await?;
            }
            let _: () = conn.del(&tag_key).await?;
            Ok(())
        }
        .await;

        if let Err(err) = result {
            warn!(tag, error = %err, "failed to evict cached responses");
        }
    }
}

#[derive(Clone)]
pub struct MemoryOutputCache {
    entries: Arc<DashMap<String, (Instant, Vec<u8>)>>,
    tags: Arc<DashMap<String, HashSet<String>>>,
    ttl: Duration,
}

impl MemoryOutputCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Arc::default(), tags: Arc::default(), ttl }
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.entries.get(key)?;
        let (expires_at, body) = entry.value();
        if Instant::now() < *expires_at {
            return Some(body.clone());
        }
        drop(entry);
        self.entries.remove(key);
        None
    }

    fn set(&self, key: &str, tags: &[&str], body: Vec<u8>) {
        self.prune_expired();
        self.entries.insert(key.to_string(), (Instant::now() + self.ttl, body));
        for tag in tags {
            self.tags.entry(tag.to_string()).or_default().insert(key.to_string());
        }
    }

    /// Drops expired entries and their tag memberships.
    fn prune_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (expires_at, _)| now < *expires_at);
        self.tags.retain(|_, keys| {
            keys.retain(|key| self.entries.contains_key(key));
            !keys.is_empty()
        });
    }

    fn evict_by_tag(&self, tag: &str) {
        if let Some((_, keys)) = self.tags.remove(tag) {
            for key in keys {
                self.entries.remove(&key);
            }
        }
    }
}

fn entry_key(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

fn tag_key(tag: &str) -> String {
    format!("{KEY_PREFIX}tag:{tag}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cache_returns_stored_body() {
        let cache = OutputCache::memory(Duration::from_secs(10));
        cache.set("movies:list", &[MOVIES_TAG], b"[]".to_vec()).await;
        assert_eq!(cache.get("movies:list").await.as_deref(), Some(&b"[]"[..]));
        assert_eq!(cache.get("movies:other").await, None);
    }

    #[tokio::test]
    async fn evicting_a_tag_drops_every_tagged_entry() {
        let cache = OutputCache::memory(Duration::from_secs(10));
        cache.set("a", &[MOVIES_TAG], b"1".to_vec()).await;
        cache.set("b", &[MOVIES_TAG], b"2".to_vec()).await;
        cache.set("c", &["other"], b"3".to_vec()).await;

        cache.evict_by_tag(MOVIES_TAG).await;

        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, None);
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = OutputCache::memory(Duration::from_secs(10));
        cache.set("a", &[MOVIES_TAG], b"1".to_vec()).await;

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn storing_prunes_expired_entries_and_tags() {
        let cache = MemoryOutputCache::new(Duration::from_secs(10));
        cache.set("a", &[MOVIES_TAG], b"1".to_vec());
        cache.set("b", &["other"], b"2".to_vec());

        tokio::time::advance(Duration::from_secs(11)).await;
        cache.set("c", &[MOVIES_TAG], b"3".to_vec());

        assert_eq!(cache.entries.len(), 1);
        assert!(cache.entries.contains_key("c"));
        assert!(!cache.tags.contains_key("other"));
        let tagged = cache.tags.get(MOVIES_TAG).map(|keys| keys.clone()).unwrap_or_default();
        assert_eq!(tagged, HashSet::from(["c".to_string()]));
    }
}
