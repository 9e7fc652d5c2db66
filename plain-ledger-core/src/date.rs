use std::fmt;

use chrono::NaiveDate;

/// Calendar date of an operation.  Displayed in ISO-8601 (`2024-01-05`) regardless of how it was
/// written in the ledger file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Returns `None` for dates that do not exist in the calendar, e.g. `2023/2/29`.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[test]
fn test_date_display() {
    assert_eq!(Date::from_ymd(2024, 1, 5).unwrap().to_string(), "2024-01-05");
    assert!(Date::from_ymd(2023, 2, 29).is_none());
    assert!(Date::from_ymd(2024, 2, 29).is_some());
    assert!(Date::from_ymd(2024, 13, 1).is_none());
}
