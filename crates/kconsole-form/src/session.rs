//! One console page: the config form plus its structured sub-editors.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info};

use kconsole_types::{AllConfigsResponse, NoticeLevel};

use crate::config_form::{GROUP_CHAT_KEY, LISTEN_LIST_KEY, TASKS_KEY};
use crate::group_chat::GroupField;
use crate::transfer::{self, ExportFile};
use crate::{ConfigForm, FormError, GroupChatEditor, ListenList, Notifier, TaskFormController};

const IMPORTED_NOTICE: &str = "配置已导入，提交配置后生效";

/// The editable state of the console.
///
/// The task list, group configs and listen list are edited through their
/// own editors; [`form_snapshot`](Self::form_snapshot) folds them back into
/// plain form fields.
pub struct ConsoleSession {
    form: ConfigForm,
    groups: GroupChatEditor,
    tasks: TaskFormController<ListenList>,
    notifier: Arc<dyn Notifier>,
}

impl ConsoleSession {
    pub fn new(form: ConfigForm, notifier: Arc<dyn Notifier>) -> Self {
        let listen = ListenList::from_field(form.get(LISTEN_LIST_KEY).unwrap_or_default());
        let groups = GroupChatEditor::deserialize(form.get(GROUP_CHAT_KEY).unwrap_or_default());
        let tasks = TaskFormController::from_field(
            form.get(TASKS_KEY).unwrap_or_default(),
            notifier.clone(),
            listen,
        );
        Self {
            form,
            groups,
            tasks,
            notifier,
        }
    }

    /// The form fields with every sub-editor folded in.
    pub fn form_snapshot(&self) -> Result<ConfigForm, FormError> {
        let mut form = self.form.clone();
        form.set(TASKS_KEY, self.tasks.field());
        form.set(GROUP_CHAT_KEY, self.groups.serialize()?);
        form.set(LISTEN_LIST_KEY, self.listen_list().to_field());
        Ok(form)
    }

    /// The `/save` payload.
    pub fn collect(&self) -> Result<Map<String, Value>, FormError> {
        Ok(self.form_snapshot()?.collect())
    }

    pub fn form(&self) -> &ConfigForm {
        &self.form
    }

    pub fn tasks(&self) -> &TaskFormController<ListenList> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskFormController<ListenList> {
        &mut self.tasks
    }

    pub fn groups(&self) -> &GroupChatEditor {
        &self.groups
    }

    pub fn listen_list(&self) -> &ListenList {
        self.tasks.provider()
    }

    pub fn add_user(&mut self, user: &str) -> bool {
        let added = self.tasks.provider_mut().add(user);
        self.tasks.refresh_chat_options();
        added
    }

    pub fn remove_user(&mut self, user: &str) -> bool {
        let removed = self.tasks.provider_mut().remove(user);
        self.tasks.refresh_chat_options();
        removed
    }

    /// Set a plain field, routing structured keys to their editors.
    pub fn set_field(&mut self, key: &str, value: &str) {
        self.apply_entry(key, &Value::String(value.to_string()));
    }

    pub fn add_group(&mut self) -> Result<String, FormError> {
        let result = self.groups.add().map(|c| c.id.clone());
        self.report(result)
    }

    pub fn remove_group(&mut self, id: &str) -> Result<(), FormError> {
        let result = if self.groups.remove(id) {
            Ok(())
        } else {
            Err(FormError::GroupNotFound(id.to_string()))
        };
        self.report(result)
    }

    pub fn set_group_field(&mut self, id: &str, field: GroupField) -> Result<(), FormError> {
        let result = self.groups.set_field(id, field);
        self.report(result)
    }

    pub fn add_trigger(&mut self, id: &str, word: &str) -> Result<(), FormError> {
        let result = self.groups.add_trigger(id, word);
        self.report(result)
    }

    pub fn remove_trigger_at(&mut self, id: &str, index: usize) -> Result<String, FormError> {
        let result = self.groups.remove_trigger_at(id, index);
        self.report(result)
    }

    /// Replace the session with the server's configuration.
    pub fn apply_remote(&mut self, response: &AllConfigsResponse) {
        let mut form = self.form_snapshot().unwrap_or_else(|_| self.form.clone());
        form.apply_server_configs(&response.configs);
        if let Some(tasks) = &response.tasks {
            form.set_value(TASKS_KEY, tasks);
        }
        info!(groups = response.configs.len(), "Loaded server configuration");
        *self = Self::new(form, self.notifier.clone());
    }

    pub fn export(&self, date: NaiveDate) -> Result<ExportFile, FormError> {
        let result = self
            .collect()
            .and_then(|config| ExportFile::new(date, &config));
        self.report(result)
    }

    /// Apply an import file. Keys absent from the file are left alone.
    pub fn import_str(&mut self, text: &str) -> Result<usize, FormError> {
        let entries = self.report(transfer::parse_import(text))?;
        let count = entries.len();
        for (key, value) in &entries {
            self.apply_entry(key, value);
        }
        debug!(count, "Imported config entries");
        self.notifier.notify(NoticeLevel::Success, IMPORTED_NOTICE);
        Ok(count)
    }

    fn apply_entry(&mut self, key: &str, value: &Value) {
        match key {
            TASKS_KEY => match value {
                Value::String(raw) => self.tasks.reload(raw),
                other => self.tasks.reload(&other.to_string()),
            },
            GROUP_CHAT_KEY => {
                self.groups = match value {
                    Value::String(raw) => GroupChatEditor::deserialize(raw),
                    other => GroupChatEditor::from_value(other.clone()),
                };
            }
            LISTEN_LIST_KEY => {
                *self.tasks.provider_mut() = ListenList::from_value(value);
                self.tasks.refresh_chat_options();
            }
            _ => self.form.set_value(key, value),
        }
    }

    fn report<T>(&self, result: Result<T, FormError>) -> Result<T, FormError> {
        if let Err(e) = &result {
            self.notifier.notify(NoticeLevel::Error, &e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use kconsole_types::ApiStatus;

    use super::*;
    use crate::testing::RecordingNotifier;

    const TASKS: &str = r#"[{"task_id":"t1","chat_id":"alice","content":"hi","schedule_type":"interval","schedule_time":"7200","interval":"7200"}]"#;

    fn session() -> (ConsoleSession, Arc<RecordingNotifier>) {
        let mut form = ConfigForm::new();
        form.set("MODEL", "gpt-4o");
        form.set(LISTEN_LIST_KEY, "alice,bob");
        form.set(TASKS_KEY, TASKS);
        let notifier = Arc::new(RecordingNotifier::default());
        (ConsoleSession::new(form, notifier.clone()), notifier)
    }

    #[test]
    fn test_new_loads_sub_editors() {
        let (s, _) = session();
        assert_eq!(s.tasks().store().len(), 1);
        assert_eq!(s.listen_list().users(), ["alice", "bob"]);
        assert_eq!(s.tasks().view().chat_options, vec!["alice", "bob"]);
        assert!(s.groups().configs().is_empty());
    }

    #[test]
    fn test_users_feed_chat_options() {
        let (mut s, _) = session();
        assert!(s.add_user("carol"));
        assert_eq!(s.tasks().view().chat_options.len(), 3);
        s.tasks_mut().view_mut().chat_id = "carol".into();
        assert!(s.remove_user("carol"));
        assert!(s.tasks().view().chat_id.is_empty());
    }

    #[test]
    fn test_snapshot_and_collect() {
        let (mut s, _) = session();
        let id = s.add_group().unwrap();
        s.add_trigger(&id, "atri").unwrap();
        s.tasks_mut().toggle_active("t1").unwrap();

        let payload = s.collect().unwrap();
        assert_eq!(payload["MODEL"], json!("gpt-4o"));
        assert_eq!(payload["LISTEN_LIST"], json!(["alice", "bob"]));
        assert_eq!(payload["TASKS"][0]["is_active"], json!(false));
        assert_eq!(payload["GROUP_CHAT_CONFIG"][0]["triggers"], json!(["atri"]));

        let reopened = ConsoleSession::new(s.form_snapshot().unwrap(), Arc::new(RecordingNotifier::default()));
        assert_eq!(reopened.groups(), s.groups());
        assert_eq!(reopened.tasks().store(), s.tasks().store());
    }

    #[test]
    fn test_group_errors_are_notified() {
        let (mut s, notifier) = session();
        s.add_group().unwrap();
        assert!(matches!(s.add_group(), Err(FormError::GroupLimit)));
        assert_eq!(notifier.last().unwrap().0, NoticeLevel::Error);
        assert!(s.remove_group("missing").is_err());
    }

    #[test]
    fn test_import_replaces_only_present_keys() {
        let (mut s, notifier) = session();
        let file = json!({
            "TASKS": [],
            "LISTEN_LIST": ["dave"],
            "TEMPERATURE": 0.66
        });
        assert_eq!(s.import_str(&file.to_string()).unwrap(), 3);
        assert!(s.tasks().store().is_empty());
        assert_eq!(s.listen_list().users(), ["dave"]);
        assert_eq!(s.form().get("TEMPERATURE"), Some("0.7"));
        assert_eq!(s.form().get("MODEL"), Some("gpt-4o"));
        assert_eq!(notifier.last().unwrap().0, NoticeLevel::Success);
    }

    #[test]
    fn test_import_rejects_non_object() {
        let (mut s, notifier) = session();
        assert!(matches!(s.import_str("[1]"), Err(FormError::Import(_))));
        assert_eq!(s.tasks().store().len(), 1);
        assert_eq!(notifier.last().unwrap().0, NoticeLevel::Error);
    }

    #[test]
    fn test_import_group_non_array_clears() {
        let (mut s, _) = session();
        s.add_group().unwrap();
        s.import_str(r#"{"GROUP_CHAT_CONFIG": {"id": "x"}}"#).unwrap();
        assert!(s.groups().configs().is_empty());
    }

    #[test]
    fn test_apply_remote() {
        let (mut s, _) = session();
        let response: AllConfigsResponse = serde_json::from_value(json!({
            "status": "success",
            "configs": {
                "user": {"LISTEN_LIST": {"value": ["erin"]}},
                "llm": {"MODEL": {"value": "deepseek-chat"}}
            },
            "tasks": []
        }))
        .unwrap();
        assert_eq!(response.status, ApiStatus::Success);
        s.apply_remote(&response);
        assert_eq!(s.form().get("MODEL"), Some("deepseek-chat"));
        assert_eq!(s.listen_list().users(), ["erin"]);
        assert!(s.tasks().store().is_empty());
    }

    #[test]
    fn test_export() {
        let (s, _) = session();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let file = s.export(date).unwrap();
        assert_eq!(file.file_name, "KouriChat_配置_2025-06-01.json");
        let parsed: Value = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(parsed["TASKS"][0]["task_id"], "t1");
        assert_eq!(parsed["GROUP_CHAT_CONFIG"], json!([]));
    }
}
