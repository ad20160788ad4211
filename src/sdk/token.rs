use std::future::Future;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Source of fresh bearer tokens.
pub trait TokenFetcher: Send + Sync {
    fn fetch(&self) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Body posted to the identity service's `/token` endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub userid: Uuid,
    pub email: String,
    pub custom_claims: Map<String, Value>,
}

pub struct HttpTokenFetcher {
    client: reqwest::Client,
    url: String,
    request: TokenRequest,
}

impl HttpTokenFetcher {
    pub fn new(client: reqwest::Client, identity_base_url: &str, request: TokenRequest) -> Self {
        let url = format!("{}/token", identity_base_url.trim_end_matches('/'));
        Self { client, url, request }
    }
}

impl TokenFetcher for HttpTokenFetcher {
    async fn fetch(&self) -> anyhow::Result<String> {
        let token = self
            .client
            .post(&self.url)
            .json(&self.request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .context("reading token response")?;
        Ok(token.trim().trim_matches('"').to_string())
    }
}

/// Caches a bearer token until its `exp` claim passes.
///
/// Only one refresh runs at a time; callers that queued behind it re-check the
/// cache and reuse the token it stored.
pub struct AuthTokenProvider<F = HttpTokenFetcher> {
    fetcher: F,
    cached: RwLock<Option<String>>,
    refresh: Mutex<()>,
}

impl<F: TokenFetcher> AuthTokenProvider<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, cached: RwLock::new(None), refresh: Mutex::new(()) }
    }

    pub async fn token(&self) -> anyhow::Result<String> {
        if let Some(token) = self.valid_cached().await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        if let Some(token) = self.valid_cached().await {
            return Ok(token);
        }

        debug!("fetching a new bearer token");
        let token = self.fetcher.fetch().await?;
        *self.cached.write().await = Some(token.clone());
        Ok(token)
    }

    async fn valid_cached(&self) -> Option<String> {
        let cached = self.cached.read().await;
        let token = cached.as_deref()?;
        let exp = expires_at(token)?;
        (exp > jiff::Timestamp::now().as_second()).then(|| token.to_string())
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Reads `exp` without verifying the signature. `None` means the token is unusable.
fn expires_at(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<ExpiryClaim>(&bytes).ok().map(|claim| claim.exp)
}
