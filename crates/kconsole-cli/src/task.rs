//! `kconsole task ...`

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use kconsole_cron::{IntervalUnit, WeekdaySet};
use kconsole_form::{ConsoleSession, TaskViewModel};
use kconsole_types::ScheduleType;

/// Schedule fields of the task form. Unset fields keep their current value.
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Schedule type: cron or interval (implied by --every)
    #[arg(long = "type")]
    pub schedule_type: Option<ScheduleType>,

    /// Minute of the hour (0-59)
    #[arg(long)]
    pub minute: Option<String>,

    /// Hour of the day (0-23), or "*" for every hour
    #[arg(long)]
    pub hour: Option<String>,

    /// Weekdays, 1 = Monday ... 7 = Sunday (e.g. 1,3,7)
    #[arg(long, value_delimiter = ',')]
    pub days: Option<Vec<u8>>,

    /// Interval length
    #[arg(long)]
    pub every: Option<String>,

    /// Interval unit: minute, hour or day
    #[arg(long)]
    pub unit: Option<IntervalUnit>,
}

impl ScheduleArgs {
    fn apply(&self, view: &mut TaskViewModel) -> Result<()> {
        if let Some(t) = self.schedule_type {
            view.schedule_type = t;
        } else if self.every.is_some() {
            view.schedule_type = ScheduleType::Interval;
        }
        if let Some(minute) = &self.minute {
            view.cron_minute = minute.clone();
        }
        if let Some(hour) = &self.hour {
            view.cron_hour = hour.clone();
        }
        if let Some(days) = &self.days {
            view.cron_weekdays = WeekdaySet::from_days(days.iter().copied())?;
        }
        if let Some(every) = &self.every {
            view.interval_value = every.clone();
        }
        if let Some(unit) = self.unit {
            view.interval_unit = unit;
        }
        view.refresh_preview();
        Ok(())
    }
}

pub fn list(session: &ConsoleSession) {
    let rows = session.tasks().task_summaries();
    if rows.is_empty() {
        println!("暂无定时任务");
        return;
    }
    for row in rows {
        println!(
            "{:<16} {:<6} {:<16} {:<24} {}",
            row.task_id, row.status, row.chat_id, row.schedule, row.content
        );
    }
}

pub fn add(
    session: &mut ConsoleSession,
    task_id: String,
    chat_id: String,
    content: String,
    schedule: &ScheduleArgs,
) -> Result<()> {
    let tasks = session.tasks_mut();
    tasks.open_create();
    let view = tasks.view_mut();
    view.task_id = task_id;
    view.chat_id = chat_id;
    view.content = content;
    schedule.apply(view)?;
    let task = tasks.save()?;
    println!("{} {}", task.task_id, kconsole_cron::describe_task(&task));
    Ok(())
}

pub fn edit(
    session: &mut ConsoleSession,
    task_id: &str,
    chat_id: Option<String>,
    content: Option<String>,
    schedule: &ScheduleArgs,
) -> Result<()> {
    let tasks = session.tasks_mut();
    tasks.open_edit(task_id)?;
    let view = tasks.view_mut();
    if let Some(chat_id) = chat_id {
        view.chat_id = chat_id;
    }
    if let Some(content) = content {
        view.content = content;
    }
    schedule.apply(view)?;
    let task = tasks.save()?;
    println!("{} {}", task.task_id, kconsole_cron::describe_task(&task));
    Ok(())
}

pub fn toggle(session: &mut ConsoleSession, task_id: &str) -> Result<()> {
    session.tasks_mut().toggle_active(task_id)?;
    Ok(())
}

/// Two-step delete; without `yes` the operator confirms on stdin.
pub fn remove(session: &mut ConsoleSession, task_id: &str, yes: bool) -> Result<bool> {
    let prompt = session.tasks_mut().request_delete(task_id)?;
    if !yes && !confirm(&prompt)? {
        session.tasks_mut().cancel_delete();
        eprintln!("已取消");
        return Ok(false);
    }
    session.tasks_mut().confirm_delete()?;
    Ok(true)
}

/// Print the preview and stored value for a schedule without saving.
pub fn preview(schedule: &ScheduleArgs) -> Result<()> {
    let mut view = TaskViewModel::default();
    schedule.apply(&mut view)?;
    println!("{}", view.preview);
    match view.schedule_type {
        ScheduleType::Cron if !view.cron_expression.is_empty() => {
            println!("{}", view.cron_expression);
        }
        ScheduleType::Cron => bail!("{}", view.preview),
        ScheduleType::Interval => {
            let value = kconsole_cron::interval::parse_positive(&view.interval_value)?;
            let seconds = kconsole_cron::interval::to_seconds(value, view.interval_unit)?;
            println!("{seconds}");
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
