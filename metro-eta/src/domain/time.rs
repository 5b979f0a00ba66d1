//! Clock time handling.
//!
//! The timetable gives times as "HH:MM:SS" strings and requests give a
//! departure as "HH:MM". Both are reduced to fractional minutes since
//! midnight, which is what the travel-time model consumes.

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Minutes in a day; arrival clocks wrap at this value.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A point on the clock, in (possibly fractional) minutes since midnight.
///
/// Values may exceed one day once travel time is added; formatting always
/// wraps modulo 24 hours.
///
/// # Examples
///
/// ```
/// use metro_eta::domain::ClockMinutes;
///
/// let t = ClockMinutes::parse_hhmm("23:50").unwrap();
/// assert_eq!(t.minutes(), 1430.0);
/// assert_eq!(t.advance(25.0).to_string(), "00:15");
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ClockMinutes(f64);

impl ClockMinutes {
    pub fn new(minutes: f64) -> Self {
        Self(minutes)
    }

    /// Parse a schedule time in "HH:MM:SS" form.
    ///
    /// Hours must be 0-23. Feed times of 24:00:00 and later (service running
    /// past midnight) are rejected like any other malformed value.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_eta::domain::ClockMinutes;
    ///
    /// assert_eq!(ClockMinutes::parse_hms("08:15:30").unwrap().minutes(), 495.5);
    /// assert!(ClockMinutes::parse_hms("25:00:00").is_err());
    /// assert!(ClockMinutes::parse_hms("08:15").is_err());
    /// ```
    pub fn parse_hms(s: &str) -> Result<Self, TimeError> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
            .map_err(|_| TimeError::new("expected HH:MM:SS"))?;
        Ok(Self::from_time(time))
    }

    /// Parse a requested departure in "HH:MM" form.
    ///
    /// Single-digit hours are accepted ("9:05").
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        let hour: u32 = parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute: u32 =
            parse_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(f64::from(hour * 60 + minute)))
    }

    fn from_time(time: NaiveTime) -> Self {
        let whole = time.hour() * 60 + time.minute();
        Self(f64::from(whole) + f64::from(time.second()) / 60.0)
    }

    /// Minutes since midnight, unwrapped.
    pub fn minutes(&self) -> f64 {
        self.0
    }

    /// The clock after `minutes` more have elapsed.
    pub fn advance(&self, minutes: f64) -> Self {
        Self(self.0 + minutes)
    }

    /// Minutes since the most recent midnight.
    pub fn minute_of_day(&self) -> f64 {
        self.0.rem_euclid(MINUTES_PER_DAY)
    }

    /// Hour and minute of day after wrapping modulo 24 hours.
    pub fn wrapped_hour_minute(&self) -> (u32, u32) {
        let of_day = self.minute_of_day();
        let hour = (of_day / 60.0).floor() as u32 % 24;
        let minute = (of_day % 60.0).floor() as u32 % 60;
        (hour, minute)
    }
}

/// Parse one or two ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Debug for ClockMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockMinutes({})", self.0)
    }
}

/// Zero-padded "HH:MM", wrapped to the day.
impl fmt::Display for ClockMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, minute) = self.wrapped_hour_minute();
        write!(f, "{:02}:{:02}", hour, minute)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..24, minute in 0u32..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    proptest! {
        /// Parse then display roundtrips
        #[test]
        fn parse_display_roundtrip(time_str in valid_time()) {
            let parsed = ClockMinutes::parse_hhmm(&time_str).unwrap();
            prop_assert_eq!(parsed.to_string(), time_str);
        }

        /// Advancing by whole days never changes the displayed clock
        #[test]
        fn whole_days_are_invisible(time_str in valid_time(), days in 0u32..5) {
            let parsed = ClockMinutes::parse_hhmm(&time_str).unwrap();
            let later = parsed.advance(f64::from(days) * MINUTES_PER_DAY);
            prop_assert_eq!(later.to_string(), time_str);
        }

        /// Wrapped hour and minute stay in range
        #[test]
        fn wrapped_in_range(minutes in 0.0f64..100_000.0) {
            let (h, m) = ClockMinutes::new(minutes).wrapped_hour_minute();
            prop_assert!(h < 24);
            prop_assert!(m < 60);
        }
    }
}
