//! Service configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// `tracing` filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServiceConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
        }
    }
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,class_sessions=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_development() {
        let config = ServiceConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_log_level_is_rejected() {
        let config = ServiceConfig {
            log_level: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidLogLevel(_))));
    }
}
