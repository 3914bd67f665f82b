//! Day of week as exchanged with clients.

use serde::{Deserialize, Serialize};

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Days after Monday (Monday = 0).
    pub fn days_from_monday(self) -> u32 {
        self.to_chrono().num_days_from_monday()
    }

    /// Days to move forward from `from` to reach this weekday (0..=6).
    pub fn days_after(self, from: Weekday) -> u32 {
        (7 + self.days_from_monday() - from.days_from_monday()) % 7
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_after_wraps_around_week() {
        assert_eq!(Weekday::Monday.days_after(Weekday::Monday), 0);
        assert_eq!(Weekday::Wednesday.days_after(Weekday::Monday), 2);
        assert_eq!(Weekday::Monday.days_after(Weekday::Saturday), 2);
        assert_eq!(Weekday::Sunday.days_after(Weekday::Monday), 6);
    }

    #[test]
    fn converts_to_and_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Fri), Weekday::Friday);
        assert_eq!(Weekday::Sunday.to_chrono(), chrono::Weekday::Sun);
    }

    #[test]
    fn serializes_in_upper_case() {
        assert_eq!(serde_json::to_string(&Weekday::Monday).unwrap(), "\"MONDAY\"");
    }
}
