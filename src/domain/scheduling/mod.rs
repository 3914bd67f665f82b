//! Scheduling module - weekly slots and recurring session planning.

mod overlap;
mod recurrence;
mod time_slot;
mod weekday;

pub use overlap::Interval;
pub use recurrence::{
    plan_occurrences, Occurrence, Plan, RecurrenceRule, RecurrenceSettings,
};
pub use time_slot::{sanitize_time_slots, SessionSlot, SlotLimits, TimeSlot};
pub use weekday::Weekday;
