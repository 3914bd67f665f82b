//! Locking configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct LockingConfig {
    /// How long a command waits for a session lock
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl LockingConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.acquire_timeout_ms == 0 {
            return Err(ValidationError::InvalidLockTimeout);
        }
        Ok(())
    }
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

fn default_acquire_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(LockingConfig::default().acquire_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = LockingConfig {
            acquire_timeout_ms: 0,
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLockTimeout));
    }
}
