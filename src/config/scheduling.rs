//! Scheduling configuration

use chrono::FixedOffset;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::scheduling::{RecurrenceSettings, SlotLimits};

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Session length bounds and recurrence planning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: i64,

    /// Exclusive upper bound
    #[serde(default = "default_max_session_hours")]
    pub max_session_hours: i64,

    /// Offset in which slot times and recurrence dates are read
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Bound on recurrence loop iterations
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

impl SchedulingConfig {
    pub fn slot_limits(&self) -> SlotLimits {
        SlotLimits {
            min_session_minutes: self.min_session_minutes,
            max_session_hours: self.max_session_hours,
        }
    }

    /// # Errors
    ///
    /// `InvalidUtcOffset` when the offset is out of range.
    pub fn recurrence_settings(&self) -> Result<RecurrenceSettings, ValidationError> {
        let utc_offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .filter(|_| self.utc_offset_minutes.abs() <= MAX_OFFSET_MINUTES)
            .ok_or(ValidationError::InvalidUtcOffset(self.utc_offset_minutes))?;
        Ok(RecurrenceSettings {
            utc_offset,
            max_generation_attempts: self.max_generation_attempts,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_session_minutes <= 0 {
            return Err(ValidationError::InvalidMinSessionLength);
        }
        if self.max_session_hours <= 0 || self.min_session_minutes >= self.max_session_hours * 60 {
            return Err(ValidationError::InvalidMaxSessionLength);
        }
        if self.max_generation_attempts == 0 {
            return Err(ValidationError::InvalidGenerationAttempts);
        }
        self.recurrence_settings()?;
        Ok(())
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            min_session_minutes: default_min_session_minutes(),
            max_session_hours: default_max_session_hours(),
            utc_offset_minutes: 0,
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

fn default_min_session_minutes() -> i64 {
    30
}

fn default_max_session_hours() -> i64 {
    24
}

fn default_max_generation_attempts() -> u32 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_rules() {
        let config = SchedulingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slot_limits(), SlotLimits::default());
        assert_eq!(
            config.recurrence_settings().unwrap().utc_offset,
            FixedOffset::east_opt(0).unwrap()
        );
    }

    #[test]
    fn offset_is_converted_to_seconds() {
        let config = SchedulingConfig {
            utc_offset_minutes: 420,
            ..Default::default()
        };
        assert_eq!(
            config.recurrence_settings().unwrap().utc_offset.local_minus_utc(),
            420 * 60
        );
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config = SchedulingConfig {
            utc_offset_minutes: -15 * 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUtcOffset(-900)));
    }

    #[test]
    fn min_must_stay_below_max() {
        let config = SchedulingConfig {
            min_session_minutes: 24 * 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxSessionLength));

        let config = SchedulingConfig {
            min_session_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMinSessionLength));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = SchedulingConfig {
            max_generation_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGenerationAttempts));
    }
}
