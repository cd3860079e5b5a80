//! Human-readable schedule text, for the editing preview and the task list.

use crate::cron::{CronSpec, Hour};
use crate::interval::{self, IntervalUnit};

const DAY_LABELS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

pub const NO_WEEKDAY_HINT: &str = "请选择执行周期";
pub const NO_INTERVAL_HINT: &str = "请设置间隔时间";

/// Label for a form day (1 = Monday .. 7 = Sunday).
pub fn day_label(day: u8) -> Option<&'static str> {
    DAY_LABELS.get(usize::from(day).checked_sub(1)?).copied()
}

fn hour_text(hour: Hour) -> String {
    match hour {
        Hour::Every => "每小时".to_string(),
        Hour::At(h) => format!("{h}点"),
    }
}

/// Preview shown while a cron schedule is being edited.
pub fn cron_preview(spec: &CronSpec) -> String {
    if spec.weekdays.is_empty() {
        return NO_WEEKDAY_HINT.to_string();
    }
    let time = format!("{} {}分", hour_text(spec.hour), spec.minute);
    if spec.weekdays.is_all() {
        return format!("每天 {time}");
    }
    let days: Vec<&str> = spec.weekdays.days().filter_map(day_label).collect();
    format!("每周 {} {time}", days.join("、"))
}

/// Preview shown while an interval schedule is being edited.
pub fn interval_preview(value: &str, unit: IntervalUnit) -> String {
    let value = value.trim();
    if value.is_empty() {
        return NO_INTERVAL_HINT.to_string();
    }
    format!("每 {value} {}", unit.label())
}

/// Describe a stored cron expression, days in expression order.
pub fn describe_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() < 5 {
        return expr.to_string();
    }
    let (minute, hour, weekday) = (fields[0], fields[1], fields[4]);

    let mut out = if weekday == "*" {
        "每天 ".to_string()
    } else {
        let days: Vec<&str> = weekday
            .split(',')
            .map(|token| match token.trim().parse::<u8>() {
                Ok(0) => "日",
                Ok(d) => day_label(d).unwrap_or(token),
                Err(_) => token,
            })
            .collect();
        format!("每周{} ", days.join("、"))
    };

    if hour == "*" {
        out.push_str(&format!("每小时{minute}分"));
    } else {
        out.push_str(&format!("{hour}点{minute}分"));
    }
    out
}

/// Describe stored interval seconds in the largest exact unit.
pub fn describe_interval(seconds: &str) -> String {
    match interval::parse_positive(seconds) {
        Ok(secs) => {
            let (value, unit) = interval::from_seconds(secs);
            format!("每{value}{}", unit.label())
        }
        Err(_) => seconds.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::WeekdaySet;

    fn spec(minute: u8, hour: Hour, days: &[u8]) -> CronSpec {
        CronSpec {
            minute,
            hour,
            weekdays: WeekdaySet::from_days(days.iter().copied()).unwrap(),
        }
    }

    #[test]
    fn test_cron_preview_weekly() {
        let s = spec(30, Hour::At(9), &[1, 3, 7]);
        assert_eq!(cron_preview(&s), "每周 一、三、日 9点 30分");
    }

    #[test]
    fn test_cron_preview_daily_hourly() {
        let s = spec(5, Hour::Every, &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(cron_preview(&s), "每天 每小时 5分");
    }

    #[test]
    fn test_cron_preview_without_days() {
        let s = spec(0, Hour::At(8), &[]);
        assert_eq!(cron_preview(&s), NO_WEEKDAY_HINT);
    }

    #[test]
    fn test_interval_preview() {
        assert_eq!(interval_preview("2", IntervalUnit::Hour), "每 2 小时");
        assert_eq!(interval_preview(" ", IntervalUnit::Day), NO_INTERVAL_HINT);
    }

    #[test]
    fn test_describe_cron() {
        assert_eq!(describe_cron("30 9 * * 0,1,3"), "每周日、一、三 9点30分");
        assert_eq!(describe_cron("0 * * * *"), "每天 每小时0分");
        assert_eq!(describe_cron("bogus"), "bogus");
    }

    #[test]
    fn test_describe_interval() {
        assert_eq!(describe_interval("7200"), "每2小时");
        assert_eq!(describe_interval("172800"), "每2天");
        assert_eq!(describe_interval("300"), "每5分钟");
        assert_eq!(describe_interval("abc"), "abc");
    }

    #[test]
    fn test_day_label_bounds() {
        assert_eq!(day_label(1), Some("一"));
        assert_eq!(day_label(7), Some("日"));
        assert_eq!(day_label(0), None);
        assert_eq!(day_label(8), None);
    }
}
