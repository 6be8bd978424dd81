//! Common types used across the back-office

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range for report queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days`-day window ending on (and including) `today`.
    ///
    /// `last_days(today, 30)` covers `today - 29 ..= today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.saturating_sub(1));
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Both bounds are inclusive. A reversed range contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(d(2025, 5, 3), d(2025, 5, 5));
        assert!(range.contains(d(2025, 5, 3)));
        assert!(range.contains(d(2025, 5, 4)));
        assert!(range.contains(d(2025, 5, 5)));
        assert!(!range.contains(d(2025, 5, 2)));
        assert!(!range.contains(d(2025, 5, 6)));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = DateRange::new(d(2025, 5, 5), d(2025, 5, 3));
        assert!(!range.contains(d(2025, 5, 4)));
    }

    #[test]
    fn test_last_days_window() {
        let range = DateRange::last_days(d(2025, 5, 30), 30);
        assert_eq!(range.start, d(2025, 5, 1));
        assert_eq!(range.end, d(2025, 5, 30));

        let single = DateRange::last_days(d(2025, 5, 30), 1);
        assert_eq!(single.start, single.end);
    }
}
