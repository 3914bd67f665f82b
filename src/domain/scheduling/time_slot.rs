//! Weekly time slots and their sanitization.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Weekday;
use crate::domain::foundation::ValidationError;

/// A requested weekly slot, with times as `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
}

impl TimeSlot {
    pub fn new(weekday: Weekday, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            weekday,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// Bounds on session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLimits {
    pub min_session_minutes: i64,
    pub max_session_hours: i64,
}

impl SlotLimits {
    /// Longest accepted duration in minutes (exclusive bound minus one).
    pub fn max_minutes_inclusive(&self) -> i64 {
        self.max_session_hours * 60 - 1
    }

    /// Checks a duration in minutes against the bounds.
    pub fn check(&self, minutes: i64) -> Result<(), ValidationError> {
        if minutes < self.min_session_minutes || minutes >= self.max_session_hours * 60 {
            return Err(ValidationError::out_of_range(
                "duration_minutes",
                self.min_session_minutes,
                self.max_minutes_inclusive(),
                minutes,
            ));
        }
        Ok(())
    }
}

impl Default for SlotLimits {
    fn default() -> Self {
        Self {
            min_session_minutes: 30,
            max_session_hours: 24,
        }
    }
}

/// A validated slot with parsed times.
///
/// An end at or before the start means the slot runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionSlot {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionSlot {
    /// Slot length in minutes, wrapping past midnight.
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.end - self.start).num_minutes();
        if minutes > 0 {
            minutes
        } else if self.end == self.start {
            0
        } else {
            minutes + 24 * 60
        }
    }

    /// Local start and end when the slot begins on `date`.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` on `start_date` when the end lies past the last
    /// representable date.
    pub fn on(&self, date: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime), ValidationError> {
        let start = date.and_time(self.start);
        let end = start
            .checked_add_signed(Duration::minutes(self.duration_minutes()))
            .ok_or_else(date_out_of_range)?;
        Ok((start, end))
    }
}

pub(crate) fn date_out_of_range() -> ValidationError {
    ValidationError::invalid_format("start_date", "date is out of range")
}

/// Parses, validates, sorts and de-duplicates requested slots.
///
/// Slots are ordered by weekday then start time.
pub fn sanitize_time_slots(
    slots: &[TimeSlot],
    limits: SlotLimits,
) -> Result<Vec<SessionSlot>, ValidationError> {
    if slots.is_empty() {
        return Err(ValidationError::empty_field("time_slots"));
    }

    let mut parsed = slots
        .iter()
        .map(|slot| {
            let parsed = SessionSlot {
                weekday: slot.weekday,
                start: parse_time("start_time", &slot.start_time)?,
                end: parse_time("end_time", &slot.end_time)?,
            };
            limits.check(parsed.duration_minutes())?;
            Ok(parsed)
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    parsed.sort();
    parsed.dedup();
    Ok(parsed)
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ValidationError::invalid_format(field, format!("'{}' is not HH:MM", value)))
}
