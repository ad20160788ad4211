use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// `RUST_LOG` wins over the configured level when present.
pub fn init(config: &LoggingConfig) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_directives(config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter));

    if config.structured {
        builder.json().flatten_event(true).with_current_span(false).init();
    } else {
        builder.init();
    }
}

fn default_directives(level: tracing::Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("{level},movies_api={level},tower_http=info,sqlx=warn,sea_orm=warn")
}
