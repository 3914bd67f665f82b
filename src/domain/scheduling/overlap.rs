//! Half-open time intervals.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// `[start, end)` span of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Touching intervals (one ends as the other starts) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn overlaps_any<'a>(&self, others: impl IntoIterator<Item = &'a Interval>) -> bool {
        others.into_iter().any(|other| self.overlaps(other))
    }
}
