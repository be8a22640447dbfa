//! Calendar month
//!
//! The time axis for every table in the engine. Months are indexed 0-11
//! and print as a short English name followed by the year, e.g. `Jan2024`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{TallyError, TallyResult};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, ordered by (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month from a year and a zero-based month index
    ///
    /// The year must lie strictly inside the calendar range of
    /// [`NaiveDate`], so `next` and `previous` always stay representable.
    pub fn new(year: i32, month: u32) -> TallyResult<Self> {
        if month >= 12 {
            return Err(TallyError::Validation(format!(
                "month index must be less than 12, got {}",
                month
            )));
        }
        let (min, max) = (NaiveDate::MIN.year(), NaiveDate::MAX.year());
        if year <= min || year >= max {
            return Err(TallyError::Validation(format!(
                "year {} is outside the supported range {} to {}",
                year,
                min + 1,
                max - 1
            )));
        }
        Ok(Self { year, month })
    }

    /// The month a calendar date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month index (0 = January)
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month >= 11 {
            Self {
                year: self.year + 1,
                month: 0,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 0 {
            Self {
                year: self.year - 1,
                month: 11,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Signed number of months from `self` to `other`
    pub fn distance(&self, other: &Month) -> i32 {
        (other.year - self.year) * 12 + other.month as i32 - self.month as i32
    }

    /// Every month in `[start, end]`, most recent first
    ///
    /// Returns an empty list when `start` is after `end`.
    pub fn range(start: Month, end: Month) -> Vec<Month> {
        let mut months = Vec::new();
        let mut month = end;
        while month >= start {
            months.push(month);
            month = month.previous();
        }
        months
    }

    /// Parse a month written as `Jan2024`
    pub fn parse(s: &str) -> TallyResult<Self> {
        let s = s.trim();
        let bad = || TallyError::Validation(format!("Bad month name {}", s));

        let name = s.get(..3).ok_or_else(bad)?;
        let index = MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .ok_or_else(bad)?;
        let year: i32 = s[3..].trim().parse().map_err(|_| bad())?;

        Self::new(year, index as u32)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MONTH_NAMES[self.month as usize], self.year)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Month::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn test_navigation_wraps_years() {
        assert_eq!(m(2024, 11).next(), m(2025, 0));
        assert_eq!(m(2025, 0).previous(), m(2024, 11));
        assert_eq!(m(2024, 4).next(), m(2024, 5));
    }

    #[test]
    fn test_next_previous_round_trip() {
        for year in [1999, 2000, 2024] {
            for month in 0..12 {
                let value = m(year, month);
                assert_eq!(value.next().previous(), value);
                assert_eq!(value.previous().next(), value);
            }
        }
    }

    #[test]
    fn test_ordering() {
        assert!(m(2023, 11) < m(2024, 0));
        assert!(m(2024, 1) < m(2024, 2));
        assert!(m(2024, 1) > m(2023, 5));
        assert_eq!(m(2024, 3).cmp(&m(2024, 3)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_distance_is_antisymmetric() {
        let a = m(2023, 10);
        let b = m(2024, 2);
        assert_eq!(a.distance(&b), 4);
        assert_eq!(b.distance(&a), -4);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_invalid_index() {
        assert!(Month::new(2024, 12).unwrap_err().is_validation());
    }

    #[test]
    fn test_year_out_of_calendar_range() {
        assert!(Month::new(i32::MAX, 11).unwrap_err().is_validation());
        assert!(Month::new(i32::MIN, 0).unwrap_err().is_validation());
        assert!(Month::parse("Dec2147483647").unwrap_err().is_validation());

        let last = Month::new(NaiveDate::MAX.year() - 1, 11).unwrap();
        assert_eq!(last.next().year(), NaiveDate::MAX.year());
        let first = Month::new(NaiveDate::MIN.year() + 1, 0).unwrap();
        assert_eq!(first.previous().year(), NaiveDate::MIN.year());
    }

    #[test]
    fn test_parse_and_display() {
        let month = Month::parse("Mar2024").unwrap();
        assert_eq!(month, m(2024, 2));
        assert_eq!(month.to_string(), "Mar2024");
        assert_eq!(Month::parse("dec1999").unwrap(), m(1999, 11));
        assert!(Month::parse("Foo2024").is_err());
        assert!(Month::parse("Jan").is_err());
        assert!(Month::parse("Ja").is_err());
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Month::from_date(date), m(2024, 0));
    }

    #[test]
    fn test_range_is_newest_first() {
        let months = Month::range(m(2023, 11), m(2024, 1));
        assert_eq!(months, vec![m(2024, 1), m(2024, 0), m(2023, 11)]);
        assert!(Month::range(m(2024, 1), m(2023, 11)).is_empty());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&m(2024, 0)).unwrap();
        assert_eq!(json, "\"Jan2024\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m(2024, 0));
    }
}
