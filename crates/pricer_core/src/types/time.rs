//! Time types for option chain snapshots.
//!
//! This module provides:
//! - `Date`: Type-safe calendar date wrapper around chrono::NaiveDate
//! - `ObservationTime`: The instant a snapshot was observed, with its UTC offset
//! - `time_to_expiry`: Act/365 year fraction floored at [`TIME_EPSILON`]
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{time_to_expiry, Date, ObservationTime};
//!
//! let observed = ObservationTime::parse("2025-08-25T16:50:00Z").unwrap();
//! let expiry = Date::parse("2025-09-04").unwrap();
//!
//! let t = time_to_expiry(observed.date(), expiry);
//! assert!((t - 10.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Smallest time-to-expiry handed to the pricing formulas, in years.
pub const TIME_EPSILON: f64 = 1e-6;

/// Calendar days per year for the Act/365 convention.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Timestamp layouts carrying an explicit offset (`Z` is normalised to `+00:00` first).
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Timestamp layouts without offset; interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Serialises as an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::Date;
///
/// let date = Date::from_ymd(2025, 8, 28).unwrap();
/// assert_eq!(date.to_string(), "2025-08-28");
///
/// let parsed: Date = "2025-08-28".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2025, 8, 25).unwrap();
/// assert_eq!(date - start, 3);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// assert!(Date::parse("2025-08-28").is_ok());
    /// assert!(Date::parse("28/08/2025").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("'{}': {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    ///
    /// The result is positive if `self` is after `other`, negative otherwise.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

/// Instant at which a snapshot was observed.
///
/// Keeps the UTC offset the timestamp was supplied with, so that
/// [`ObservationTime::date`] yields the calendar date the quoting venue saw.
///
/// # Accepted layouts
///
/// - RFC 3339 / ISO 8601 with `Z` or a numeric offset (`2025-08-25T16:50:00Z`,
///   `2025-08-25T22:20:00+05:30`)
/// - Date and time without offset, `T` or space separated, optional seconds and
///   fraction (treated as UTC)
/// - A bare date (`2025-08-25`, midnight UTC)
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::{Date, ObservationTime};
///
/// let t = ObservationTime::parse("2025-08-25T23:30:00-05:00").unwrap();
/// // Local calendar date in the supplied offset
/// assert_eq!(t.date(), Date::from_ymd(2025, 8, 25).unwrap());
///
/// assert!(ObservationTime::parse("yesterday").is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObservationTime(DateTime<FixedOffset>);

impl ObservationTime {
    /// Parses an ISO 8601 timestamp. A trailing `Z` is UTC.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DateError::ParseError("empty timestamp".to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt));
        }

        let normalised = match trimmed.strip_suffix(['Z', 'z']) {
            Some(head) => format!("{}+00:00", head),
            None => trimmed.to_string(),
        };

        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalised, format) {
                return Ok(Self(dt));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(naive.and_utc().fixed_offset()));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self(date.and_time(NaiveTime::MIN).and_utc().fixed_offset()));
        }

        Err(DateError::ParseError(format!(
            "'{}' is not an ISO 8601 timestamp",
            s
        )))
    }

    /// The current instant in UTC.
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }

    /// Calendar date of the observation in its own offset.
    pub fn date(&self) -> Date {
        Date(self.0.date_naive())
    }

    /// Returns the underlying chrono timestamp.
    pub fn into_inner(self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl FromStr for ObservationTime {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        ObservationTime::parse(s)
    }
}

impl fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Time to expiry in years between an observation date and an expiry date.
///
/// Act/365 on whole calendar days, floored at [`TIME_EPSILON`] so expired and
/// same-day contracts never reach a formula that divides by √T.
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::{time_to_expiry, Date, TIME_EPSILON};
///
/// let observed = Date::from_ymd(2025, 8, 25).unwrap();
/// let expiry = Date::from_ymd(2025, 8, 28).unwrap();
/// assert!((time_to_expiry(observed, expiry) - 3.0 / 365.0).abs() < 1e-15);
///
/// // Expired contract
/// assert_eq!(time_to_expiry(expiry, observed), TIME_EPSILON);
/// ```
#[inline]
pub fn time_to_expiry(observation: Date, expiry: Date) -> f64 {
    let days = (expiry - observation) as f64;
    (days / DAYS_PER_YEAR).max(TIME_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_date_parse_and_display() {
        let date = Date::parse("2025-08-28").unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 8);
        assert_eq!(date.day(), 28);
        assert_eq!(date.to_string(), "2025-08-28");
    }

    #[test]
    fn test_date_parse_invalid() {
        assert!(Date::parse("2025-02-30").is_err());
        assert!(Date::parse("not-a-date").is_err());
        assert!(matches!(
            Date::from_ymd(2025, 13, 1),
            Err(DateError::InvalidDate { month: 13, .. })
        ));
    }

    #[test]
    fn test_observation_time_utc_z() {
        let t = ObservationTime::parse("2025-08-25T16:50:00Z").unwrap();
        assert_eq!(t.date(), Date::from_ymd(2025, 8, 25).unwrap());
        assert_eq!(t.into_inner().offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_observation_time_fractional_seconds() {
        // Shape produced by live feeds: isoformat() + "Z"
        let t = ObservationTime::parse("2025-08-25T16:50:00.123456Z").unwrap();
        assert_eq!(t.date(), Date::from_ymd(2025, 8, 25).unwrap());
    }

    #[test]
    fn test_observation_time_numeric_offset_keeps_local_date() {
        let t = ObservationTime::parse("2025-08-26T01:00:00+05:30").unwrap();
        assert_eq!(t.date(), Date::from_ymd(2025, 8, 26).unwrap());
        assert_eq!(t.into_inner().offset().local_minus_utc(), 19800);
    }

    #[test]
    fn test_observation_time_naive_is_utc() {
        let t = ObservationTime::parse("2025-08-25T16:50:00").unwrap();
        assert_eq!(t.into_inner().offset().local_minus_utc(), 0);

        let t = ObservationTime::parse("2025-08-25 16:50").unwrap();
        assert_eq!(t.date(), Date::from_ymd(2025, 8, 25).unwrap());
    }

    #[test]
    fn test_observation_time_bare_date() {
        let t = ObservationTime::parse("2025-08-25").unwrap();
        assert_eq!(t.date(), Date::from_ymd(2025, 8, 25).unwrap());
    }

    #[test]
    fn test_observation_time_garbage() {
        assert!(ObservationTime::parse("").is_err());
        assert!(ObservationTime::parse("   ").is_err());
        assert!(ObservationTime::parse("16:50 yesterday").is_err());
        assert!(ObservationTime::parse("2025-13-40T00:00:00Z").is_err());
    }

    #[test]
    fn test_time_to_expiry_known_values() {
        let observed = Date::from_ymd(2025, 8, 25).unwrap();
        let expiry = Date::from_ymd(2025, 8, 28).unwrap();
        assert_relative_eq!(time_to_expiry(observed, expiry), 0.008219178, epsilon = 1e-9);
    }

    #[test]
    fn test_time_to_expiry_floors_same_day_and_expired() {
        let d = Date::from_ymd(2025, 8, 25).unwrap();
        assert_eq!(time_to_expiry(d, d), TIME_EPSILON);

        let past = Date::from_ymd(2025, 8, 1).unwrap();
        assert_eq!(time_to_expiry(d, past), TIME_EPSILON);
    }

    proptest! {
        #[test]
        fn prop_time_to_expiry_strictly_positive(offset in -2000i64..2000) {
            let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
            let other = base + chrono::Duration::days(offset);
            let t = time_to_expiry(Date::from(base), Date::from(other));
            prop_assert!(t >= TIME_EPSILON);
            if offset > 0 {
                prop_assert!((t - offset as f64 / DAYS_PER_YEAR).abs() < 1e-12);
            }
        }
    }
}
