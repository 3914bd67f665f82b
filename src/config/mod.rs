//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CLASS_SESSIONS`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use class_sessions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Lock timeout: {:?}", config.locking.acquire_timeout());
//! ```

mod error;
mod locking;
mod scheduling;
mod service;

pub use error::{ConfigError, ValidationError};
pub use locking::LockingConfig;
pub use scheduling::SchedulingConfig;
pub use service::{Environment, ServiceConfig};

use serde::Deserialize;

/// Root application configuration. Every section has defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub scheduling: SchedulingConfig,

    #[serde(default)]
    pub locking: LockingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CLASS_SESSIONS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `CLASS_SESSIONS__LOCKING__ACQUIRE_TIMEOUT_MS=5000` -> `locking.acquire_timeout_ms = 5000`
    /// - `CLASS_SESSIONS__SCHEDULING__UTC_OFFSET_MINUTES=420` -> `scheduling.utc_offset_minutes = 420`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLASS_SESSIONS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.service.validate()?;
        self.scheduling.validate()?;
        self.locking.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.service.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "CLASS_SESSIONS__SERVICE__ENVIRONMENT",
        "CLASS_SESSIONS__SCHEDULING__UTC_OFFSET_MINUTES",
        "CLASS_SESSIONS__SCHEDULING__MIN_SESSION_MINUTES",
        "CLASS_SESSIONS__LOCKING__ACQUIRE_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().unwrap();

        assert_eq!(config.service.environment, Environment::Development);
        assert_eq!(config.scheduling.min_session_minutes, 30);
        assert_eq!(config.locking.acquire_timeout_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_nested_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CLASS_SESSIONS__SERVICE__ENVIRONMENT", "production");
        env::set_var("CLASS_SESSIONS__SCHEDULING__UTC_OFFSET_MINUTES", "-300");
        env::set_var("CLASS_SESSIONS__LOCKING__ACQUIRE_TIMEOUT_MS", "2500");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.scheduling.utc_offset_minutes, -300);
        assert_eq!(config.locking.acquire_timeout_ms, 2500);
    }

    #[test]
    fn validation_reports_first_bad_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CLASS_SESSIONS__SCHEDULING__MIN_SESSION_MINUTES", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidMinSessionLength));
    }
}
