use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use uuid::Uuid;

const MAX_SETTING_LEN: usize = 255;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub environment: Environment,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub api_key: Uuid,
    pub redis_url: Option<String>,
    pub output_cache_ttl: Duration,
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub key: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: tracing::Level,
    pub structured: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every setting through `lookup` and reports all invalid ones at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut problems = Vec::new();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT").unwrap_or_else(|| "3000".to_string());
        let addr = format!("{host}:{port}").parse::<SocketAddr>().context("HOST/PORT");
        let addr = match addr {
            Ok(addr) => Some(addr),
            Err(err) => {
                problems.push(format!("{err:#}: '{host}:{port}' is not a valid socket address"));
                None
            },
        };

        let environment = match var("APP_ENV").as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("development") | Some("dev") => Environment::Development,
            None | Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                problems.push(format!("APP_ENV: unknown environment '{other}'"));
                Environment::Production
            },
        };

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://movies.db?mode=rwc".to_string());
        if database_url.is_empty() {
            problems.push("DATABASE_URL: must not be empty".to_string());
        } else if !["sqlite:", "postgres:", "postgresql:"]
            .iter()
            .any(|scheme| database_url.starts_with(scheme))
        {
            problems.push(format!("DATABASE_URL: unsupported connection string '{database_url}'"));
        }

        let mut required = |key: &str| -> String {
            let value = var(key).unwrap_or_default();
            if value.is_empty() {
                problems.push(format!("{key}: must not be empty"));
            } else if value.len() > MAX_SETTING_LEN {
                problems.push(format!("{key}: must be {MAX_SETTING_LEN} characters or fewer"));
            }
            value
        };
        let jwt = JwtConfig {
            key: required("JWT_KEY"),
            issuer: required("JWT_ISSUER"),
            audience: required("JWT_AUDIENCE"),
        };

        let api_key_raw = var("API_KEY").unwrap_or_default();
        let api_key = match Uuid::parse_str(&api_key_raw) {
            Ok(key) => key,
            Err(_) => {
                problems.push(format!("API_KEY: '{api_key_raw}' is not a valid GUID"));
                Uuid::nil()
            },
        };

        let redis_url = var("REDIS_URL");
        if let Some(url) = redis_url.as_deref() {
            if url.is_empty() {
                problems.push("REDIS_URL: must not be empty when set".to_string());
            } else if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
                problems.push(format!("REDIS_URL: '{url}' is not a redis connection string"));
            }
        }

        let output_cache_ttl = match var("OUTPUT_CACHE_TTL_SECS").map(|s| s.parse::<u64>()) {
            None => Duration::from_secs(10),
            Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
            Some(_) => {
                problems.push("OUTPUT_CACHE_TTL_SECS: must be a positive integer".to_string());
                Duration::from_secs(10)
            },
        };

        let level_raw = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let level = match level_raw.parse::<tracing::Level>() {
            Ok(level) => level,
            Err(_) => {
                problems.push(format!("LOG_LEVEL: '{level_raw}' is not a log level"));
                tracing::Level::INFO
            },
        };
        let structured_raw = var("LOG_STRUCTURED").map(|v| v.to_ascii_lowercase());
        let structured = match structured_raw.as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                problems.push(format!("LOG_STRUCTURED: '{other}' is not a boolean"));
                false
            },
        };

        match addr {
            Some(addr) if problems.is_empty() => Ok(Self {
                addr,
                environment,
                database_url,
                jwt,
                api_key,
                redis_url: redis_url.filter(|u| !u.is_empty()),
                output_cache_ttl,
                logging: LoggingConfig { level, structured },
            }),
            _ => anyhow::bail!("invalid configuration:\n  {}", problems.join("\n  ")),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
