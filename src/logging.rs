//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over `LOG_LEVEL` when set. Request handlers run inside the
//! `request` span opened by the tracking middleware, so every event they emit
//! carries the request id without passing it around.

use crate::config::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Noisy targets capped at `warn` in production.
const PRODUCTION_QUIET_TARGETS: &[&str] = &["sqlx", "tower_http"];

/// Filter directives derived from configuration.
pub fn filter_directives(config: &Config) -> String {
    let mut directives = config.log_level.to_ascii_lowercase();
    if config.is_production() {
        for target in PRODUCTION_QUIET_TARGETS {
            directives.push_str(&format!(",{}=warn", target));
        }
    }
    directives
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(config)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
        LogFormat::Text => subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_development_directives() {
        let mut config = Config::default_config();
        config.log_level = "DEBUG".to_string();
        assert_eq!(filter_directives(&config), "debug");
    }

    #[test]
    fn test_production_quiets_noisy_targets() {
        let mut config = Config::default_config();
        config.environment = Environment::Production;
        assert_eq!(
            filter_directives(&config),
            "info,sqlx=warn,tower_http=warn"
        );
    }
}
