//! Interval schedules: a (value, unit) pair stored as total seconds.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("interval must be positive")]
    NotPositive,
    #[error("interval is too large")]
    Overflow,
    #[error("invalid interval unit: {0:?}")]
    InvalidUnit(String),
    #[error("invalid interval value: {0:?}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Minute,
    #[default]
    Hour,
    Day,
}

impl IntervalUnit {
    pub const fn seconds(self) -> u64 {
        match self {
            IntervalUnit::Minute => 60,
            IntervalUnit::Hour => 3600,
            IntervalUnit::Day => 86400,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalUnit::Minute => "分钟",
            IntervalUnit::Hour => "小时",
            IntervalUnit::Day => "天",
        }
    }
}

/// Written as the unit's length in seconds, the way the form stores it.
impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seconds())
    }
}

impl FromStr for IntervalUnit {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "60" | "minute" | "minutes" | "m" => Ok(IntervalUnit::Minute),
            "3600" | "hour" | "hours" | "h" => Ok(IntervalUnit::Hour),
            "86400" | "day" | "days" | "d" => Ok(IntervalUnit::Day),
            other => Err(IntervalError::InvalidUnit(other.to_string())),
        }
    }
}

/// Total seconds for `value` units.
pub fn to_seconds(value: u64, unit: IntervalUnit) -> Result<u64, IntervalError> {
    if value == 0 {
        return Err(IntervalError::NotPositive);
    }
    value
        .checked_mul(unit.seconds())
        .ok_or(IntervalError::Overflow)
}

/// Split seconds into the largest unit that divides them exactly.
///
/// Seconds that are not a multiple of 60 are truncated to whole minutes.
pub fn from_seconds(seconds: u64) -> (u64, IntervalUnit) {
    if seconds % IntervalUnit::Day.seconds() == 0 {
        (seconds / IntervalUnit::Day.seconds(), IntervalUnit::Day)
    } else if seconds % IntervalUnit::Hour.seconds() == 0 {
        (seconds / IntervalUnit::Hour.seconds(), IntervalUnit::Hour)
    } else {
        (seconds / IntervalUnit::Minute.seconds(), IntervalUnit::Minute)
    }
}

/// Parse a positive integer (a form value or a stored seconds string).
pub fn parse_positive(s: &str) -> Result<u64, IntervalError> {
    let trimmed = s.trim();
    match trimmed.parse::<u64>() {
        Ok(0) => Err(IntervalError::NotPositive),
        Ok(n) => Ok(n),
        Err(_) => Err(IntervalError::InvalidValue(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_seconds() {
        assert_eq!(to_seconds(2, IntervalUnit::Hour), Ok(7200));
        assert_eq!(to_seconds(3, IntervalUnit::Day), Ok(259200));
        assert_eq!(to_seconds(0, IntervalUnit::Minute), Err(IntervalError::NotPositive));
        assert_eq!(to_seconds(u64::MAX, IntervalUnit::Day), Err(IntervalError::Overflow));
    }

    #[test]
    fn test_from_seconds_prefers_largest_unit() {
        assert_eq!(from_seconds(7200), (2, IntervalUnit::Hour));
        assert_eq!(from_seconds(86400), (1, IntervalUnit::Day));
        assert_eq!(from_seconds(172800), (2, IntervalUnit::Day));
        assert_eq!(from_seconds(90), (1, IntervalUnit::Minute));
        assert_eq!(from_seconds(1500), (25, IntervalUnit::Minute));
    }

    #[test]
    fn test_from_seconds_round_trips_exact_multiples() {
        for n in 1..50u64 {
            for unit in [IntervalUnit::Minute, IntervalUnit::Hour, IntervalUnit::Day] {
                let secs = n * unit.seconds();
                let (value, picked) = from_seconds(secs);
                assert_eq!(to_seconds(value, picked), Ok(secs));
                if unit == IntervalUnit::Day {
                    assert_eq!(picked, IntervalUnit::Day);
                }
            }
        }
    }

    #[test]
    fn test_unit_parse_and_display() {
        assert_eq!("3600".parse::<IntervalUnit>(), Ok(IntervalUnit::Hour));
        assert_eq!("day".parse::<IntervalUnit>(), Ok(IntervalUnit::Day));
        assert!("120".parse::<IntervalUnit>().is_err());
        assert_eq!(IntervalUnit::Minute.to_string(), "60");
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(" 12 "), Ok(12));
        assert_eq!(parse_positive("0"), Err(IntervalError::NotPositive));
        assert!(matches!(parse_positive("-3"), Err(IntervalError::InvalidValue(_))));
        assert!(matches!(parse_positive(""), Err(IntervalError::InvalidValue(_))));
    }
}
