//! kconsole-cron: schedule rules for scheduled chat messages.
//!
//! Converts between form selections and the `schedule_time` strings stored
//! in task records, and keeps the ordered task list. Schedules are never
//! executed here.

pub mod cron;
pub mod interval;
pub mod preview;
pub mod store;

use thiserror::Error;

use kconsole_types::{ScheduleType, TaskRecord};

pub use cron::{CronError, CronSpec, Hour, WeekdaySet};
pub use interval::{IntervalError, IntervalUnit};
pub use store::{TaskListStore, Upsert};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Cron(#[from] CronError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// A fully specified timing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Cron(CronSpec),
    Interval { value: u64, unit: IntervalUnit },
}

impl Schedule {
    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            Schedule::Cron(_) => ScheduleType::Cron,
            Schedule::Interval { .. } => ScheduleType::Interval,
        }
    }

    /// The canonical `schedule_time` string.
    pub fn schedule_time(&self) -> Result<String, ScheduleError> {
        match self {
            Schedule::Cron(spec) => Ok(spec.build()?),
            Schedule::Interval { value, unit } => {
                Ok(interval::to_seconds(*value, *unit)?.to_string())
            }
        }
    }

    /// Recover the rule from a stored record.
    pub fn from_record(task: &TaskRecord) -> Result<Self, ScheduleError> {
        match task.schedule_type {
            ScheduleType::Cron => Ok(Schedule::Cron(CronSpec::parse(&task.schedule_time)?)),
            ScheduleType::Interval => {
                if task.interval_diverges() {
                    tracing::warn!(
                        task_id = %task.task_id,
                        "interval mirror differs from schedule_time, using schedule_time"
                    );
                }
                let raw = task.interval_seconds().unwrap_or_default();
                let (value, unit) = interval::from_seconds(interval::parse_positive(raw)?);
                Ok(Schedule::Interval { value, unit })
            }
        }
    }

    /// Build a new, active task record using this rule.
    pub fn to_task(
        &self,
        task_id: &str,
        chat_id: &str,
        content: &str,
    ) -> Result<TaskRecord, ScheduleError> {
        let schedule_time = self.schedule_time()?;
        let interval = match self {
            Schedule::Interval { .. } => Some(schedule_time.clone()),
            Schedule::Cron(_) => None,
        };
        Ok(TaskRecord {
            task_id: task_id.to_string(),
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            schedule_type: self.schedule_type(),
            schedule_time,
            interval,
            is_active: true,
        })
    }
}

/// List text for a stored record's timing rule.
pub fn describe_task(task: &TaskRecord) -> String {
    match task.schedule_type {
        ScheduleType::Cron => preview::describe_cron(&task.schedule_time),
        ScheduleType::Interval => {
            preview::describe_interval(task.interval_seconds().unwrap_or_default())
        }
    }
}
