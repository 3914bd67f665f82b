//! Weekly recurrence planning.
//!
//! Turns a start date, a stop rule and a set of weekly slots into concrete
//! session intervals. Slot times and dates are local to a fixed UTC offset.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::time_slot::date_out_of_range;
use super::{Interval, SessionSlot, Weekday};
use crate::domain::foundation::{Timestamp, ValidationError};

/// When to stop generating sessions.
///
/// A count takes precedence over an end date. With neither, exactly one
/// session is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub number_of_sessions: Option<u32>,
    /// Inclusive.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub fn single(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            number_of_sessions: None,
            end_date: None,
        }
    }

    pub fn counted(start_date: NaiveDate, number_of_sessions: u32) -> Self {
        Self {
            start_date,
            number_of_sessions: Some(number_of_sessions),
            end_date: None,
        }
    }

    pub fn until(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            number_of_sessions: None,
            end_date: Some(end_date),
        }
    }

    /// A request for one session rather than a series.
    pub fn is_single(&self) -> bool {
        match (self.number_of_sessions, self.end_date) {
            (Some(count), _) => count == 1,
            (None, end_date) => end_date.is_none(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(count) = self.number_of_sessions {
            if count == 0 {
                return Err(ValidationError::out_of_range(
                    "number_of_sessions_to_create",
                    1,
                    i64::from(u32::MAX),
                    0,
                ));
            }
        }
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(ValidationError::invalid_format(
                    "recurrence_end_date",
                    "must not be before the start date",
                ));
            }
        }
        Ok(())
    }
}

/// Planning knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSettings {
    pub utc_offset: FixedOffset,
    pub max_generation_attempts: u32,
}

impl RecurrenceSettings {
    /// Places `slot` on the local `date`.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` on `start_date` near the ends of the calendar.
    pub fn occurrence_on(
        &self,
        slot: SessionSlot,
        date: NaiveDate,
    ) -> Result<Occurrence, ValidationError> {
        let (local_start, local_end) = slot.on(date)?;
        Ok(Occurrence {
            slot,
            local_start,
            interval: Interval::new(self.to_utc(local_start)?, self.to_utc(local_end)?),
        })
    }

    fn to_utc(&self, local: NaiveDateTime) -> Result<Timestamp, ValidationError> {
        let naive_utc = local
            .checked_sub_signed(Duration::seconds(i64::from(self.utc_offset.local_minus_utc())))
            .ok_or_else(date_out_of_range)?;
        Ok(Timestamp::from_datetime(Utc.from_utc_datetime(&naive_utc)))
    }
}

/// One planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub slot: SessionSlot,
    pub local_start: NaiveDateTime,
    pub interval: Interval,
}

impl Occurrence {
    pub fn local_date(&self) -> NaiveDate {
        self.local_start.date()
    }
}

/// Result of planning a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub occurrences: Vec<Occurrence>,
    /// Candidates dropped because they overlapped.
    pub skipped: usize,
    /// The attempt bound stopped the loop before the rule was satisfied.
    pub exhausted: bool,
}

fn overlap_error() -> ValidationError {
    ValidationError::invalid_format(
        "time_slots",
        "session overlaps an existing session of the class",
    )
}

/// Plans the sessions of one creation request.
///
/// `is_free` reports whether an interval is clear of the class's existing
/// sessions; candidates are also checked against each other. Overlapping
/// candidates of a series are skipped without counting towards the
/// requested number. When only one session results it is pinned to the
/// requested start date and an overlap becomes an error.
///
/// # Errors
///
/// Validation errors for an invalid rule, no slots, an overlapping single
/// session or a series with no free candidate.
pub fn plan_occurrences<F>(
    rule: &RecurrenceRule,
    slots: &[SessionSlot],
    settings: &RecurrenceSettings,
    now: Timestamp,
    mut is_free: F,
) -> Result<Plan, ValidationError>
where
    F: FnMut(&Interval) -> bool,
{
    rule.validate()?;
    let first_slot = *slots
        .first()
        .ok_or_else(|| ValidationError::empty_field("time_slots"))?;

    if rule.is_single() {
        let pinned = settings.occurrence_on(first_slot, rule.start_date)?;
        if !is_free(&pinned.interval) {
            return Err(overlap_error());
        }
        return Ok(Plan {
            occurrences: vec![pinned],
            skipped: 0,
            exhausted: false,
        });
    }

    let mut cursor = midnight(rule.start_date)?;
    let mut accepted: Vec<Occurrence> = Vec::new();
    let mut skipped = 0;
    let mut attempts = 0;
    let mut exhausted = true;

    while attempts < settings.max_generation_attempts {
        if let Some(count) = rule.number_of_sessions {
            if accepted.len() >= count as usize {
                exhausted = false;
                break;
            }
        }
        attempts += 1;

        let mut candidate = next_occurrence(slots, cursor, settings)?;
        if candidate.interval.end.is_before(&now) {
            cursor = advance(cursor, Duration::days(1))?;
            candidate = next_occurrence(slots, cursor, settings)?;
        }

        if rule.number_of_sessions.is_none() {
            if let Some(end_date) = rule.end_date {
                if candidate.local_date() > end_date {
                    exhausted = false;
                    break;
                }
            }
        }

        cursor = advance(candidate.local_start, Duration::seconds(1))?;

        let clashes = candidate
            .interval
            .overlaps_any(accepted.iter().map(|o| &o.interval));
        if clashes || !is_free(&candidate.interval) {
            skipped += 1;
            continue;
        }
        accepted.push(candidate);
    }

    match accepted.as_slice() {
        [] => Err(ValidationError::invalid_format(
            "time_slots",
            "no free time slot within the recurrence window",
        )),
        [only] => {
            let pinned = settings.occurrence_on(only.slot, rule.start_date)?;
            if !is_free(&pinned.interval) {
                return Err(overlap_error());
            }
            Ok(Plan {
                occurrences: vec![pinned],
                skipped,
                exhausted,
            })
        }
        _ => Ok(Plan {
            occurrences: accepted,
            skipped,
            exhausted,
        }),
    }
}

/// Earliest slot occurrence starting at or after `cursor`.
fn next_occurrence(
    slots: &[SessionSlot],
    cursor: NaiveDateTime,
    settings: &RecurrenceSettings,
) -> Result<Occurrence, ValidationError> {
    let today = Weekday::from(cursor.weekday());
    let mut earliest: Option<Occurrence> = None;
    for slot in slots {
        let ahead = Duration::days(i64::from(slot.weekday.days_after(today)));
        let mut date = cursor
            .date()
            .checked_add_signed(ahead)
            .ok_or_else(date_out_of_range)?;
        if date.and_time(slot.start) < cursor {
            date = date
                .checked_add_signed(Duration::days(7))
                .ok_or_else(date_out_of_range)?;
        }
        let occurrence = settings.occurrence_on(*slot, date)?;
        if earliest.map_or(true, |e| occurrence.local_start < e.local_start) {
            earliest = Some(occurrence);
        }
    }
    earliest.ok_or_else(|| ValidationError::empty_field("time_slots"))
}

fn advance(at: NaiveDateTime, by: Duration) -> Result<NaiveDateTime, ValidationError> {
    at.checked_add_signed(by).ok_or_else(date_out_of_range)
}

fn midnight(date: NaiveDate) -> Result<NaiveDateTime, ValidationError> {
    NaiveTime::from_hms_opt(0, 0, 0)
        .map(|time| date.and_time(time))
        .ok_or_else(|| ValidationError::invalid_format("start_date", "invalid date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scheduling::{sanitize_time_slots, SlotLimits, TimeSlot};

    fn settings() -> RecurrenceSettings {
        RecurrenceSettings {
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            max_generation_attempts: 1000,
        }
    }

    fn slots(requested: &[TimeSlot]) -> Vec<SessionSlot> {
        sanitize_time_slots(requested, SlotLimits::default()).unwrap()
    }

    fn monday_nine() -> Vec<SessionSlot> {
        slots(&[TimeSlot::new(Weekday::Monday, "09:00", "10:00")])
    }

    /// A Monday well in the future.
    fn future_monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn long_ago() -> Timestamp {
        Timestamp::epoch()
    }

    #[test]
    fn three_mondays_from_a_monday() {
        let plan = plan_occurrences(
            &RecurrenceRule::counted(future_monday(), 3),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| true,
        )
        .unwrap();

        let dates: Vec<_> = plan.occurrences.iter().map(Occurrence::local_date).collect();
        assert_eq!(
            dates,
            vec![
                future_monday(),
                NaiveDate::from_ymd_opt(2030, 1, 14).unwrap(),
                NaiveDate::from_ymd_opt(2030, 1, 21).unwrap(),
            ]
        );
        assert!(!plan.exhausted);
    }

    #[test]
    fn two_slots_on_the_same_day_are_both_used() {
        let plan = plan_occurrences(
            &RecurrenceRule::counted(future_monday(), 4),
            &slots(&[
                TimeSlot::new(Weekday::Monday, "14:00", "15:00"),
                TimeSlot::new(Weekday::Monday, "09:00", "10:00"),
            ]),
            &settings(),
            long_ago(),
            |_| true,
        )
        .unwrap();

        let hours: Vec<_> = plan
            .occurrences
            .iter()
            .map(|o| o.local_start.format("%d %H").to_string())
            .collect();
        assert_eq!(hours, vec!["07 09", "07 14", "14 09", "14 14"]);
    }

    #[test]
    fn end_date_is_inclusive() {
        let plan = plan_occurrences(
            &RecurrenceRule::until(future_monday(), NaiveDate::from_ymd_opt(2030, 1, 21).unwrap()),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| true,
        )
        .unwrap();

        assert_eq!(plan.occurrences.len(), 3);
    }

    #[test]
    fn overlapping_candidates_are_skipped_without_consuming_count() {
        let blocked = settings()
            .occurrence_on(monday_nine()[0], NaiveDate::from_ymd_opt(2030, 1, 14).unwrap())
            .unwrap()
            .interval;

        let plan = plan_occurrences(
            &RecurrenceRule::counted(future_monday(), 3),
            &monday_nine(),
            &settings(),
            long_ago(),
            |candidate| !candidate.overlaps(&blocked),
        )
        .unwrap();

        let dates: Vec<_> = plan.occurrences.iter().map(|o| o.local_date().day()).collect();
        assert_eq!(dates, vec![7, 21, 28]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn single_request_is_pinned_to_start_date() {
        // A Tuesday start with a Monday slot still lands on the Tuesday.
        let tuesday = NaiveDate::from_ymd_opt(2030, 1, 8).unwrap();

        let plan = plan_occurrences(
            &RecurrenceRule::single(tuesday),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| true,
        )
        .unwrap();

        assert_eq!(plan.occurrences.len(), 1);
        assert_eq!(plan.occurrences[0].local_date(), tuesday);
    }

    #[test]
    fn single_request_overlap_is_an_error() {
        let result = plan_occurrences(
            &RecurrenceRule::single(future_monday()),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| false,
        );

        assert_eq!(result.unwrap_err().field(), "time_slots");
    }

    #[test]
    fn series_with_one_result_is_pinned() {
        // The window only fits one Wednesday; the start is the Monday before.
        let plan = plan_occurrences(
            &RecurrenceRule::until(future_monday(), NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()),
            &slots(&[TimeSlot::new(Weekday::Wednesday, "18:00", "19:30")]),
            &settings(),
            long_ago(),
            |_| true,
        )
        .unwrap();

        assert_eq!(plan.occurrences.len(), 1);
        assert_eq!(plan.occurrences[0].local_date(), future_monday());
    }

    #[test]
    fn past_candidate_moves_cursor_forward_one_day() {
        let monday = future_monday();
        let now = settings()
            .occurrence_on(monday_nine()[0], monday)
            .unwrap()
            .interval
            .end
            .plus_minutes(1);

        let plan = plan_occurrences(
            &RecurrenceRule::counted(monday, 2),
            &monday_nine(),
            &settings(),
            now,
            |_| true,
        )
        .unwrap();

        assert_eq!(plan.occurrences[0].local_date().day(), 14);
    }

    #[test]
    fn utc_offset_shifts_intervals() {
        let hanoi = RecurrenceSettings {
            utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
            max_generation_attempts: 10,
        };

        let occurrence = hanoi.occurrence_on(monday_nine()[0], future_monday()).unwrap();

        assert_eq!(
            occurrence.interval.start.to_string(),
            "2030-01-07T02:00:00+00:00"
        );
    }

    #[test]
    fn fully_blocked_count_terminates() {
        let result = plan_occurrences(
            &RecurrenceRule::counted(future_monday(), 5),
            &monday_nine(),
            &RecurrenceSettings {
                max_generation_attempts: 20,
                ..settings()
            },
            long_ago(),
            |_| false,
        );

        assert!(result.is_err());
    }

    #[test]
    fn zero_count_is_rejected() {
        let result = plan_occurrences(
            &RecurrenceRule::counted(future_monday(), 0),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| true,
        );

        assert_eq!(
            result.unwrap_err().field(),
            "number_of_sessions_to_create"
        );
    }

    #[test]
    fn dates_at_the_end_of_the_calendar_are_rejected() {
        let late_night = slots(&[TimeSlot::new(Weekday::Monday, "23:30", "00:30")]);

        let single = plan_occurrences(
            &RecurrenceRule::single(NaiveDate::MAX),
            &late_night,
            &settings(),
            long_ago(),
            |_| true,
        );
        let series = plan_occurrences(
            &RecurrenceRule::counted(NaiveDate::MAX, 3),
            &monday_nine(),
            &settings(),
            long_ago(),
            |_| true,
        );

        assert_eq!(single.unwrap_err().field(), "start_date");
        assert_eq!(series.unwrap_err().field(), "start_date");
    }
}
