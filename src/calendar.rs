//! Gregorian calendar dates without a time-of-day component
//!
//! Dates are stored as plain (year, month, day) triples. Only the strict
//! `YYYY-MM-DD` text form is accepted on input.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar date in the proleptic Gregorian calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Date {
    year: i32,
    month: u32,
    day: u32,
}

/// Leap year rule: divisible by 400, or by 4 and not by 100
pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Number of days in the given month (1-12)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month as usize).saturating_sub(1).min(11)]
    }
}

impl Date {
    /// Build a date, returning `None` if month or day is out of range
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Parse exactly `YYYY-MM-DD`
    ///
    /// Single-digit months or days, other separators and surrounding
    /// whitespace are all rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 4 && *i != 7)
            .all(|(_, b)| b.is_ascii_digit());
        if !digits_ok {
            return None;
        }

        let year: i32 = text[0..4].parse().ok()?;
        let month: u32 = text[5..7].parse().ok()?;
        let day: u32 = text[8..10].parse().ok()?;
        Self::from_ymd(year, month, day)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Add whole months (negative to go back), clamping the day to the
    /// last day of the destination month
    ///
    /// Jan 31 + 1 month is Feb 28 (or 29), never a date in March.
    pub fn add_months(&self, months: i32) -> Self {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        let year = total.div_euclid(12) as i32;
        let month = total.rem_euclid(12) as u32 + 1;
        let day = self.day.min(days_in_month(year, month));
        Self { year, month, day }
    }

    /// Three-way comparison on (year, month, day)
    pub fn compare(&self, other: &Date) -> Ordering {
        self.cmp(other)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl From<Date> for String {
    fn from(date: Date) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for Date {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Date::parse(&text).ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", text))
    }
}

/// Source of "today" for date fallbacks and reports
pub trait Clock {
    fn today(&self) -> Date;
}

/// Clock handle shared by the repositories of one ledger
pub type SharedClock = Rc<dyn Clock>;

/// Reads the local calendar date from the system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Local::now().date_naive().into()
    }
}

/// Always returns the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_format_round_trip() {
        for text in ["2024-01-01", "2024-02-29", "1999-12-31", "0001-06-15", "2000-02-29"] {
            let date = Date::parse(text).unwrap();
            assert_eq!(date.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(Date::parse("2024-1-01").is_none());
        assert!(Date::parse("2024/01/01").is_none());
        assert!(Date::parse(" 2024-01-01").is_none());
        assert!(Date::parse("2024-01-0a").is_none());
        assert!(Date::parse("+024-01-01").is_none());
        assert!(Date::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Date::parse("2024-13-01").is_none());
        assert!(Date::parse("2024-00-10").is_none());
        assert!(Date::parse("2024-04-31").is_none());
        assert!(Date::parse("2023-02-29").is_none());
        assert!(Date::parse("1900-02-29").is_none());
        assert!(Date::parse("2024-01-00").is_none());
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 11), 30);
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(d(2024, 1, 31).add_months(1), d(2024, 2, 29));
        assert_eq!(d(2023, 1, 31).add_months(1), d(2023, 2, 28));
        assert_eq!(d(2024, 3, 31).add_months(1), d(2024, 4, 30));
    }

    #[test]
    fn test_add_months_carries_years() {
        assert_eq!(d(2024, 11, 15).add_months(3), d(2025, 2, 15));
        assert_eq!(d(2024, 1, 1).add_months(24), d(2026, 1, 1));
        assert_eq!(d(2024, 2, 10).add_months(-3), d(2023, 11, 10));
        assert_eq!(d(2024, 3, 31).add_months(-1), d(2024, 2, 29));
        assert_eq!(d(2024, 5, 5).add_months(0), d(2024, 5, 5));
    }

    #[test]
    fn test_compare() {
        assert_eq!(d(2024, 1, 1).compare(&d(2024, 1, 2)), Ordering::Less);
        assert_eq!(d(2025, 1, 1).compare(&d(2024, 12, 31)), Ordering::Greater);
        assert_eq!(d(2024, 6, 1).compare(&d(2024, 6, 1)), Ordering::Equal);
    }

    #[test]
    fn test_fixed_clock_and_naive_date() {
        let clock = FixedClock(d(2024, 7, 4));
        assert_eq!(clock.today(), d(2024, 7, 4));

        let naive = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(Date::from(naive), d(2020, 2, 29));
    }

    #[test]
    fn test_serde_as_text() {
        let json = serde_json::to_string(&d(2024, 3, 9)).unwrap();
        assert_eq!(json, "\"2024-03-09\"");
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d(2024, 3, 9));
        assert!(serde_json::from_str::<Date>("\"2024-3-9\"").is_err());
    }
}
