use std::sync::Arc;

use movies_api::{AppState, cache::OutputCache, config::Config, db, error, logging};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env()?);
    logging::init(&config.logging);
    error::expose_details(config.is_development());

    let db = db::connect_and_migrate(&config.database_url).await?;
    let cache = OutputCache::connect(config.redis_url.as_deref(), config.output_cache_ttl).await?;

    let state = Arc::new(AppState::new(config.clone(), db, cache));
    let app = movies_api::app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, environment = ?config.environment, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
