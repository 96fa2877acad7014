//! Logging setup
//!
//! Installs a global `tracing` subscriber. The `AMEND_LOG` environment
//! variable takes priority over the configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{AmendError, Result};

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "AMEND_LOG";

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| AmendError::Logging(format!("invalid level '{}': {}", config.level, e))),
    }
}

/// Initialize logging
///
/// Fails instead of panicking when a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let subscriber = fmt()
        .with_env_filter(build_filter(config)?)
        .with_target(config.with_target)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AmendError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "amend=notalevel".into(),
            with_target: false,
        };
        assert!(matches!(build_filter(&config), Err(AmendError::Logging(_))));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
