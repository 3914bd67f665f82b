//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured filter. Production emits JSON lines,
//! every other environment the human-readable format.

use thiserror::Error;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::ServiceConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    #[error("tracing subscriber already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails when the configured filter does not parse or a subscriber is
/// already installed.
pub fn init_tracing(config: &ServiceConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let json = config
        .is_production()
        .then(|| tracing_subscriber::fmt::layer().json());
    let pretty = (!config.is_production()).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_is_rejected() {
        // Only reachable when RUST_LOG is unset
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ServiceConfig {
            log_level: "class_sessions=loud".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            init_tracing(&config),
            Err(TelemetryError::InvalidFilter(_))
        ));
    }
}
