//! Ordered in-memory task list, synchronized to the serialized `TASKS` field.

use serde_json::Value;
use tracing::{debug, warn};

use kconsole_types::{ScheduleType, TaskRecord};

/// Outcome of [`TaskListStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Task records in insertion order; edits replace in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListStore {
    tasks: Vec<TaskRecord>,
}

impl TaskListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    /// Load from the serialized field. Never fails: malformed input yields an
    /// empty store and a warning.
    pub fn deserialize(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Failed to parse task list, starting empty: {e}");
                Self::new()
            }
        }
    }

    /// Load from an already-parsed JSON value. Entries that are not valid
    /// task records are skipped.
    pub fn from_value(value: Value) -> Self {
        let Value::Array(items) = value else {
            if !value.is_null() {
                warn!("Task list is not an array, starting empty");
            }
            return Self::new();
        };
        let mut tasks = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<TaskRecord>(item) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!("Skipping malformed task record: {e}"),
            }
        }
        Self { tasks }
    }

    pub fn serialize(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.tasks)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.tasks)
    }

    /// Insert or replace by `task_id`. A replaced record keeps its position.
    ///
    /// The `interval` mirror is rewritten from `schedule_time` on the way in.
    pub fn upsert(&mut self, mut task: TaskRecord) -> Upsert {
        match task.schedule_type {
            ScheduleType::Interval => task.interval = Some(task.schedule_time.clone()),
            ScheduleType::Cron => task.interval = None,
        }
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
            debug!(task_id = %task.task_id, "Replacing task");
            *slot = task;
            Upsert::Replaced
        } else {
            debug!(task_id = %task.task_id, "Adding task");
            self.tasks.push(task);
            Upsert::Inserted
        }
    }

    /// Remove every record with this id; returns how many were removed.
    pub fn remove(&mut self, task_id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.task_id != task_id);
        before - self.tasks.len()
    }

    /// Flip `is_active`. Returns the new state, or `None` if the id is unknown.
    pub fn toggle_active(&mut self, task_id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.task_id == task_id)?;
        task.is_active = !task.is_active;
        Some(task.is_active)
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.get(task_id).is_some()
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, content: &str) -> TaskRecord {
        TaskRecord {
            task_id: id.into(),
            chat_id: "alice".into(),
            content: content.into(),
            schedule_type: ScheduleType::Cron,
            schedule_time: "0 8 * * 1".into(),
            interval: None,
            is_active: true,
        }
    }

    #[test]
    fn test_upsert_new_appends() {
        let mut store = TaskListStore::new();
        assert_eq!(store.upsert(task("a", "1")), Upsert::Inserted);
        assert_eq!(store.upsert(task("b", "2")), Upsert::Inserted);
        assert_eq!(store.len(), 2);
        assert_eq!(store.tasks()[1].task_id, "b");
    }

    #[test]
    fn test_upsert_existing_replaces_in_place() {
        let mut store = TaskListStore::new();
        store.upsert(task("a", "1"));
        store.upsert(task("b", "2"));
        store.upsert(task("c", "3"));
        assert_eq!(store.upsert(task("b", "changed")), Upsert::Replaced);
        assert_eq!(store.len(), 3);
        assert_eq!(store.tasks()[1].content, "changed");
        assert_eq!(store.tasks()[2].task_id, "c");
    }

    #[test]
    fn test_upsert_syncs_interval_mirror() {
        let mut store = TaskListStore::new();
        let mut t = task("a", "1");
        t.schedule_type = ScheduleType::Interval;
        t.schedule_time = "7200".into();
        t.interval = Some("60".into());
        store.upsert(t);
        assert_eq!(store.get("a").unwrap().interval.as_deref(), Some("7200"));

        let mut t = task("b", "2");
        t.interval = Some("60".into());
        store.upsert(t);
        assert!(store.get("b").unwrap().interval.is_none());
    }

    #[test]
    fn test_remove() {
        let mut store = TaskListStore::from_tasks(vec![task("a", "1"), task("b", "2")]);
        assert_eq!(store.remove("missing"), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove("a"), 1);
        assert_eq!(store.tasks()[0].task_id, "b");
    }

    #[test]
    fn test_remove_drops_duplicates() {
        let mut store = TaskListStore::from_tasks(vec![task("a", "1"), task("a", "2")]);
        assert_eq!(store.remove("a"), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_active() {
        let mut store = TaskListStore::from_tasks(vec![task("a", "1")]);
        assert_eq!(store.toggle_active("a"), Some(false));
        assert_eq!(store.toggle_active("a"), Some(true));
        assert_eq!(store.toggle_active("nope"), None);
    }

    #[test]
    fn test_serialize_then_deserialize() {
        let store = TaskListStore::from_tasks(vec![task("a", "1"), task("b", "2")]);
        let raw = store.serialize().unwrap();
        assert_eq!(TaskListStore::deserialize(&raw), store);
    }

    #[test]
    fn test_deserialize_malformed_is_empty() {
        assert!(TaskListStore::deserialize("[{\"task_id\": ").is_empty());
        assert!(TaskListStore::deserialize("").is_empty());
        assert!(TaskListStore::deserialize("{\"a\": 1}").is_empty());
        assert!(TaskListStore::deserialize("null").is_empty());
    }

    #[test]
    fn test_deserialize_skips_bad_entries() {
        let raw = r#"[
            {"task_id":"a","chat_id":"x","content":"y","schedule_type":"cron","schedule_time":"0 8 * * 1"},
            {"task_id":"b"}
        ]"#;
        let store = TaskListStore::deserialize(raw);
        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
    }
}
