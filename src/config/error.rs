//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Minimum session length must be positive")]
    InvalidMinSessionLength,

    #[error("Maximum session length must exceed the minimum")]
    InvalidMaxSessionLength,

    #[error("UTC offset must be within +/-14 hours, got {0} minutes")]
    InvalidUtcOffset(i32),

    #[error("Recurrence generation attempts must be positive")]
    InvalidGenerationAttempts,

    #[error("Lock acquire timeout must be positive")]
    InvalidLockTimeout,
}
