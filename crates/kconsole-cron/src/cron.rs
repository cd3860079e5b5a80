//! 5-field cron expressions built from weekday/hour/minute selections.
//!
//! Only the minute, hour and weekday fields are driven by the form; day of
//! month and month are always `*`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("no weekday selected")]
    NoWeekday,
    #[error("invalid minute: {0:?}")]
    InvalidMinute(String),
    #[error("invalid hour: {0:?}")]
    InvalidHour(String),
    #[error("invalid weekday: {0} (expected 1-7)")]
    InvalidWeekday(u8),
    #[error("expected 5 cron fields, got {0}")]
    FieldCount(usize),
}

/// Set of form weekdays, 1 = Monday through 7 = Sunday.
///
/// Day 7 is written as `0` in cron expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    const ALL_BITS: u8 = 0b0111_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    pub fn from_days<I: IntoIterator<Item = u8>>(days: I) -> Result<Self, CronError> {
        let mut set = Self::empty();
        for day in days {
            set.insert(day)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, day: u8) -> Result<(), CronError> {
        if !(1..=7).contains(&day) {
            return Err(CronError::InvalidWeekday(day));
        }
        self.0 |= 1 << (day - 1);
        Ok(())
    }

    pub fn remove(&mut self, day: u8) {
        if (1..=7).contains(&day) {
            self.0 &= !(1 << (day - 1));
        }
    }

    pub fn contains(&self, day: u8) -> bool {
        (1..=7).contains(&day) && self.0 & (1 << (day - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL_BITS
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected form days in ascending order (1..=7).
    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=7).filter(move |d| self.contains(*d))
    }

    /// Cron weekday field, ascending by cron value (Sunday `0` first).
    pub fn to_cron_field(&self) -> String {
        let mut values: Vec<u8> = self.days().map(to_cron_day).collect();
        values.sort_unstable();
        values
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Read a cron weekday field. `*` selects every day; unknown tokens are skipped.
    pub fn from_cron_field(field: &str) -> Self {
        let field = field.trim();
        if field == "*" {
            return Self::all();
        }
        let mut set = Self::empty();
        for token in field.split(',') {
            let day = match token.trim() {
                "0" => 7,
                t => match t.parse::<u8>() {
                    Ok(d @ 1..=6) => d,
                    _ => continue,
                },
            };
            set.0 |= 1 << (day - 1);
        }
        set
    }
}

fn to_cron_day(day: u8) -> u8 {
    if day == 7 { 0 } else { day }
}

/// Hour field: a clock hour or every hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hour {
    Every,
    At(u8),
}

impl Hour {
    pub fn parse(s: &str) -> Result<Self, CronError> {
        let s = s.trim();
        if s == "*" {
            return Ok(Hour::Every);
        }
        match s.parse::<u8>() {
            Ok(h) if h < 24 => Ok(Hour::At(h)),
            _ => Err(CronError::InvalidHour(s.to_string())),
        }
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hour::Every => f.write_str("*"),
            Hour::At(h) => write!(f, "{h}"),
        }
    }
}

pub fn parse_minute(s: &str) -> Result<u8, CronError> {
    let s = s.trim();
    match s.parse::<u8>() {
        Ok(m) if m < 60 => Ok(m),
        _ => Err(CronError::InvalidMinute(s.to_string())),
    }
}

/// The form-editable part of a cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSpec {
    pub minute: u8,
    pub hour: Hour,
    pub weekdays: WeekdaySet,
}

impl CronSpec {
    pub fn new(minute: &str, hour: &str, weekdays: WeekdaySet) -> Result<Self, CronError> {
        Ok(Self {
            minute: parse_minute(minute)?,
            hour: Hour::parse(hour)?,
            weekdays,
        })
    }

    /// Render as `"{minute} {hour} * * {weekdays}"`.
    pub fn build(&self) -> Result<String, CronError> {
        if self.weekdays.is_empty() {
            return Err(CronError::NoWeekday);
        }
        Ok(format!(
            "{} {} * * {}",
            self.minute,
            self.hour,
            self.weekdays.to_cron_field()
        ))
    }

    /// Read minute, hour and weekday back out of an expression.
    ///
    /// Day-of-month and month are ignored.
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(CronError::FieldCount(fields.len()));
        }
        Ok(Self {
            minute: parse_minute(fields[0])?,
            hour: Hour::parse(fields[1])?,
            weekdays: WeekdaySet::from_cron_field(fields[4]),
        })
    }
}

/// Build an expression straight from form values.
pub fn build(minute: &str, hour: &str, weekdays: WeekdaySet) -> Result<String, CronError> {
    CronSpec::new(minute, hour, weekdays)?.build()
}

pub fn parse(expr: &str) -> Result<CronSpec, CronError> {
    CronSpec::parse(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_maps_sunday_to_zero_first() {
        let days = WeekdaySet::from_days([1, 3, 7]).unwrap();
        assert_eq!(build("30", "9", days).unwrap(), "30 9 * * 0,1,3");
    }

    #[test]
    fn test_build_every_hour() {
        let days = WeekdaySet::from_days([2]).unwrap();
        assert_eq!(build("15", "*", days).unwrap(), "15 * * * 2");
    }

    #[test]
    fn test_build_rejects_empty_weekdays() {
        assert_eq!(
            build("0", "8", WeekdaySet::empty()),
            Err(CronError::NoWeekday)
        );
    }

    #[test]
    fn test_build_rejects_out_of_range() {
        let days = WeekdaySet::all();
        assert!(matches!(build("60", "8", days), Err(CronError::InvalidMinute(_))));
        assert!(matches!(build("0", "24", days), Err(CronError::InvalidHour(_))));
        assert!(matches!(build("x", "8", days), Err(CronError::InvalidMinute(_))));
        assert_eq!(
            WeekdaySet::from_days([0]),
            Err(CronError::InvalidWeekday(0))
        );
    }

    #[test]
    fn test_parse_extracts_fields() {
        let spec = parse("30 9 * * 0,1,3").unwrap();
        assert_eq!(spec.minute, 30);
        assert_eq!(spec.hour, Hour::At(9));
        assert_eq!(spec.weekdays.days().collect::<Vec<_>>(), vec![1, 3, 7]);
    }

    #[test]
    fn test_parse_wildcard_weekday_and_hour() {
        let spec = parse("5 * * * *").unwrap();
        assert_eq!(spec.hour, Hour::Every);
        assert!(spec.weekdays.is_all());
    }

    #[test]
    fn test_parse_ignores_day_and_month() {
        let spec = parse("0 12 15 6 5").unwrap();
        assert_eq!(spec.build().unwrap(), "0 12 * * 5");
    }

    #[test]
    fn test_parse_skips_unknown_weekday_tokens() {
        let spec = parse("0 8 * * 1,7,x,6").unwrap();
        assert_eq!(spec.weekdays.days().collect::<Vec<_>>(), vec![1, 6]);
    }

    #[test]
    fn test_parse_too_few_fields() {
        assert_eq!(parse("0 8 * *"), Err(CronError::FieldCount(4)));
        assert_eq!(parse(""), Err(CronError::FieldCount(0)));
    }

    #[test]
    fn test_parse_build_reproduces_selection() {
        for days in [vec![1], vec![7], vec![1, 2, 3, 4, 5, 6, 7], vec![2, 4, 6, 7]] {
            for (minute, hour) in [("0", "0"), ("59", "23"), ("30", "*")] {
                let set = WeekdaySet::from_days(days.clone()).unwrap();
                let spec = parse(&build(minute, hour, set).unwrap()).unwrap();
                assert_eq!(spec.minute.to_string(), minute);
                assert_eq!(spec.hour.to_string(), hour);
                assert_eq!(spec.weekdays, set);
            }
        }
    }

    #[test]
    fn test_weekday_set_ops() {
        let mut set = WeekdaySet::empty();
        set.insert(7).unwrap();
        set.insert(2).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(7));
        set.remove(7);
        assert!(!set.contains(7));
        assert_eq!(set.to_cron_field(), "2");
        assert_eq!(WeekdaySet::all().to_cron_field(), "0,1,2,3,4,5,6");
    }
}
