//! Scheduled-task form: the task view model and its controller.

use std::sync::Arc;

use tracing::{debug, warn};

use kconsole_cron::cron::{self, CronError, CronSpec};
use kconsole_cron::interval::{self, IntervalUnit};
use kconsole_cron::{Schedule, TaskListStore, WeekdaySet, preview};
use kconsole_types::{NoticeLevel, ScheduleType, TaskRecord};

use crate::{ChatIdProvider, FormError, Notifier};

const SAVED_NOTICE: &str = "任务已保存，提交配置后生效";
const DELETED_NOTICE: &str = "任务已删除，提交配置后生效";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

/// Every field of the task form.
///
/// Both schedule sub-forms are kept; only the one matching
/// `schedule_type` is shown and saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewModel {
    pub mode: FormMode,
    pub task_id: String,
    /// Set while editing: ids are immutable once created.
    pub task_id_locked: bool,
    pub chat_id: String,
    pub content: String,
    pub schedule_type: ScheduleType,
    pub cron_minute: String,
    pub cron_hour: String,
    pub cron_weekdays: WeekdaySet,
    /// Expression for the current cron selection; empty while incomplete.
    pub cron_expression: String,
    pub interval_value: String,
    pub interval_unit: IntervalUnit,
    /// Recipients offered in the chat id picker.
    pub chat_options: Vec<String>,
    pub preview: String,
}

impl Default for TaskViewModel {
    fn default() -> Self {
        let mut view = Self {
            mode: FormMode::Create,
            task_id: String::new(),
            task_id_locked: false,
            chat_id: String::new(),
            content: String::new(),
            schedule_type: ScheduleType::Cron,
            cron_minute: "0".to_string(),
            cron_hour: "8".to_string(),
            cron_weekdays: WeekdaySet::all(),
            cron_expression: String::new(),
            interval_value: String::new(),
            interval_unit: IntervalUnit::Hour,
            chat_options: Vec::new(),
            preview: String::new(),
        };
        view.refresh_preview();
        view
    }
}

impl TaskViewModel {
    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "添加定时任务",
            FormMode::Edit => "编辑定时任务",
        }
    }

    pub fn save_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "保存",
            FormMode::Edit => "保存修改",
        }
    }

    fn cron_spec(&self) -> Result<CronSpec, CronError> {
        CronSpec::new(&self.cron_minute, &self.cron_hour, self.cron_weekdays)
    }

    /// Recompute the preview text and the cron expression.
    pub fn refresh_preview(&mut self) {
        match self.schedule_type {
            ScheduleType::Cron => match self.cron_spec() {
                Ok(spec) => {
                    self.preview = preview::cron_preview(&spec);
                    self.cron_expression = spec.build().unwrap_or_default();
                }
                Err(e) => {
                    self.preview = e.to_string();
                    self.cron_expression.clear();
                }
            },
            ScheduleType::Interval => {
                self.preview = preview::interval_preview(&self.interval_value, self.interval_unit);
            }
        }
    }

    /// Fill the fields from a stored record. Only the sub-form of the
    /// record's schedule type is overwritten.
    ///
    /// An unreadable schedule resets that sub-form so it must be set again
    /// before saving; the returned error says what was lost. A sub-minute
    /// interval is rounded up to whole minutes and also reported.
    pub fn load(&mut self, task: &TaskRecord) -> Result<(), FormError> {
        self.task_id = task.task_id.clone();
        self.chat_id = task.chat_id.clone();
        self.content = task.content.clone();
        self.schedule_type = task.schedule_type;

        let outcome = match task.schedule_type {
            ScheduleType::Cron => match cron::parse(&task.schedule_time) {
                Ok(spec) => {
                    self.cron_minute = spec.minute.to_string();
                    self.cron_hour = spec.hour.to_string();
                    self.cron_weekdays = spec.weekdays;
                    Ok(())
                }
                Err(e) => {
                    warn!(task_id = %task.task_id, "Unreadable cron expression: {e}");
                    self.cron_minute.clear();
                    self.cron_hour.clear();
                    self.cron_weekdays = WeekdaySet::empty();
                    Err(FormError::UnreadableSchedule(task.schedule_time.clone()))
                }
            },
            ScheduleType::Interval => match task.interval_seconds().map(interval::parse_positive) {
                Some(Ok(seconds)) => {
                    let (value, unit) = interval::from_seconds(seconds);
                    if value * unit.seconds() == seconds {
                        self.interval_value = value.to_string();
                        self.interval_unit = unit;
                        Ok(())
                    } else {
                        let minutes = seconds.div_ceil(IntervalUnit::Minute.seconds());
                        self.interval_value = minutes.to_string();
                        self.interval_unit = IntervalUnit::Minute;
                        Err(FormError::IntervalRounded { seconds, minutes })
                    }
                }
                _ => {
                    warn!(task_id = %task.task_id, "Unreadable interval");
                    self.interval_value.clear();
                    Err(FormError::UnreadableSchedule(task.schedule_time.clone()))
                }
            },
        };
        self.refresh_preview();
        outcome
    }

    /// The schedule of the visible sub-form, validated.
    fn schedule(&self) -> Result<Schedule, FormError> {
        match self.schedule_type {
            ScheduleType::Cron => {
                if self.cron_weekdays.is_empty() {
                    return Err(FormError::MissingCron);
                }
                let spec = self.cron_spec().map_err(|e| FormError::InvalidSchedule(e.into()))?;
                Ok(Schedule::Cron(spec))
            }
            ScheduleType::Interval => {
                if self.interval_value.trim().is_empty() {
                    return Err(FormError::MissingInterval);
                }
                let value = interval::parse_positive(&self.interval_value)
                    .map_err(|e| FormError::InvalidSchedule(e.into()))?;
                Ok(Schedule::Interval {
                    value,
                    unit: self.interval_unit,
                })
            }
        }
    }

    /// Build the record to save. No side effects.
    pub fn to_record(&self) -> Result<TaskRecord, FormError> {
        let task_id = self.task_id.trim();
        let chat_id = self.chat_id.trim();
        let content = self.content.trim();
        if task_id.is_empty() || chat_id.is_empty() || content.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(self.schedule()?.to_task(task_id, chat_id, content)?)
    }
}

/// One row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub task_id: String,
    pub is_active: bool,
    pub status: &'static str,
    pub chat_id: String,
    pub schedule: String,
    pub content: String,
}

impl TaskSummary {
    fn from_task(task: &TaskRecord) -> Self {
        Self {
            task_id: task.task_id.clone(),
            is_active: task.is_active,
            status: if task.is_active { "运行中" } else { "已暂停" },
            chat_id: task.chat_id.clone(),
            schedule: kconsole_cron::describe_task(task),
            content: task.content.clone(),
        }
    }
}

/// Drives the task form against a [`TaskListStore`].
///
/// Every mutation rewrites the serialized field returned by [`field`](Self::field).
pub struct TaskFormController<P> {
    store: TaskListStore,
    field: String,
    view: TaskViewModel,
    pending_delete: Option<String>,
    notifier: Arc<dyn Notifier>,
    chat_ids: P,
}

impl<P: ChatIdProvider> TaskFormController<P> {
    pub fn new(store: TaskListStore, notifier: Arc<dyn Notifier>, chat_ids: P) -> Self {
        let field = store.serialize().unwrap_or_else(|e| {
            warn!("Failed to serialize task list: {e}");
            "[]".to_string()
        });
        let mut controller = Self {
            store,
            field,
            view: TaskViewModel::default(),
            pending_delete: None,
            notifier,
            chat_ids,
        };
        controller.refresh_chat_options();
        controller
    }

    /// Initialize from the serialized field; malformed data starts empty.
    pub fn from_field(raw: &str, notifier: Arc<dyn Notifier>, chat_ids: P) -> Self {
        Self::new(TaskListStore::deserialize(raw), notifier, chat_ids)
    }

    /// Replace the whole list from a serialized field.
    pub fn reload(&mut self, raw: &str) {
        self.store = TaskListStore::deserialize(raw);
        self.pending_delete = None;
        if let Err(e) = self.sync_field() {
            warn!("Failed to serialize task list: {e}");
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn store(&self) -> &TaskListStore {
        &self.store
    }

    pub fn view(&self) -> &TaskViewModel {
        &self.view
    }

    /// Mutable access for binding widgets. Call [`TaskViewModel::refresh_preview`]
    /// after changing schedule fields.
    pub fn view_mut(&mut self) -> &mut TaskViewModel {
        &mut self.view
    }

    pub fn provider(&self) -> &P {
        &self.chat_ids
    }

    /// Mutable access to the chat id source; refresh the options afterwards.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.chat_ids
    }

    /// Re-read recipients. The current choice is kept only if still offered.
    pub fn refresh_chat_options(&mut self) {
        self.view.chat_options = self.chat_ids.chat_ids();
        if !self.view.chat_id.is_empty() && !self.view.chat_options.contains(&self.view.chat_id) {
            debug!(chat_id = %self.view.chat_id, "Chat id no longer offered");
            self.view.chat_id.clear();
        }
    }

    /// Reset the form for a new task.
    pub fn open_create(&mut self) {
        self.view = TaskViewModel::default();
        self.refresh_chat_options();
    }

    /// Load an existing task into the form.
    pub fn open_edit(&mut self, task_id: &str) -> Result<(), FormError> {
        let Some(task) = self.store.get(task_id).cloned() else {
            return Err(self.fail(FormError::TaskNotFound(task_id.to_string())));
        };
        self.view.mode = FormMode::Edit;
        self.view.task_id_locked = true;
        self.view.chat_options = self.chat_ids.chat_ids();
        if !self.view.chat_options.contains(&task.chat_id) {
            warn!(task_id, chat_id = %task.chat_id, "Task recipient is not in the listen list");
        }
        if let Err(e) = self.view.load(&task) {
            self.notifier.notify(NoticeLevel::Warning, &e.to_string());
        }
        Ok(())
    }

    /// Switch the visible schedule sub-form.
    pub fn set_schedule_type(&mut self, schedule_type: ScheduleType) {
        self.view.schedule_type = schedule_type;
        self.view.refresh_preview();
    }

    /// Validate the form and upsert the task. Nothing changes on failure.
    pub fn save(&mut self) -> Result<TaskRecord, FormError> {
        let mut record = match self.view.to_record() {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if self.view.task_id_locked {
            if let Some(existing) = self.store.get(&record.task_id) {
                record.is_active = existing.is_active;
            }
        }

        let previous = self.store.clone();
        self.store.upsert(record.clone());
        if let Err(e) = self.sync_field() {
            self.store = previous;
            return Err(self.fail(e));
        }
        debug!(task_id = %record.task_id, "Task saved");
        self.notifier.notify(NoticeLevel::Success, SAVED_NOTICE);
        Ok(record)
    }

    /// First phase of a delete: returns the confirmation prompt.
    pub fn request_delete(&mut self, task_id: &str) -> Result<String, FormError> {
        if !self.store.contains(task_id) {
            return Err(self.fail(FormError::TaskNotFound(task_id.to_string())));
        }
        self.pending_delete = Some(task_id.to_string());
        Ok(format!("确定要删除任务 \"{task_id}\" 吗？此操作不可撤销。"))
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second phase of a delete. Returns the removed id.
    pub fn confirm_delete(&mut self) -> Result<String, FormError> {
        let Some(task_id) = self.pending_delete.take() else {
            return Err(self.fail(FormError::NoPendingDelete));
        };
        let previous = self.store.clone();
        self.store.remove(&task_id);
        if let Err(e) = self.sync_field() {
            self.store = previous;
            return Err(self.fail(e));
        }
        self.notifier.notify(NoticeLevel::Success, DELETED_NOTICE);
        Ok(task_id)
    }

    /// Pause or resume a task. Returns the new state.
    pub fn toggle_active(&mut self, task_id: &str) -> Result<bool, FormError> {
        let Some(active) = self.store.toggle_active(task_id) else {
            return Err(self.fail(FormError::TaskNotFound(task_id.to_string())));
        };
        if let Err(e) = self.sync_field() {
            self.store.toggle_active(task_id);
            return Err(self.fail(e));
        }
        let status = if active { "启用" } else { "禁用" };
        self.notifier
            .notify(NoticeLevel::Success, &format!("任务已{status}，提交配置后生效"));
        Ok(active)
    }

    pub fn task_summaries(&self) -> Vec<TaskSummary> {
        self.store.tasks().iter().map(TaskSummary::from_task).collect()
    }

    fn sync_field(&mut self) -> Result<(), FormError> {
        self.field = self.store.serialize()?;
        Ok(())
    }

    fn fail(&self, err: FormError) -> FormError {
        self.notifier.notify(NoticeLevel::Error, &err.to_string());
        err
    }
}
