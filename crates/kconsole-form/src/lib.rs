//! kconsole-form: the editable state behind the configuration console.
//!
//! Everything here is independent of any UI toolkit. A front end binds its
//! widgets to the view models, forwards operator actions to the controllers
//! and renders notices delivered through a [`Notifier`].

pub mod config_form;
pub mod group_chat;
pub mod listen_list;
pub mod models;
pub mod session;
pub mod task_form;
pub mod transfer;

use thiserror::Error;

use kconsole_cron::ScheduleError;
use kconsole_types::NoticeLevel;

pub use config_form::ConfigForm;
pub use group_chat::GroupChatEditor;
pub use listen_list::ListenList;
pub use session::ConsoleSession;
pub use task_form::{FormMode, TaskFormController, TaskSummary, TaskViewModel};

/// Delivers operator-facing notices (toasts, status lines, stderr...).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Supplies the chat ids a task may be addressed to.
pub trait ChatIdProvider {
    fn chat_ids(&self) -> Vec<String>;
}

impl ChatIdProvider for Vec<String> {
    fn chat_ids(&self) -> Vec<String> {
        self.clone()
    }
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::error!("{message}"),
            NoticeLevel::Warning => tracing::warn!("{message}"),
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!("{message}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("请填写所有必填字段")]
    MissingFields,
    #[error("请设置执行时间")]
    MissingCron,
    #[error("请设置间隔时间")]
    MissingInterval,
    #[error("执行时间无效: {0}")]
    InvalidSchedule(#[from] ScheduleError),
    #[error("任务执行时间无法解析，请重新设置: {0}")]
    UnreadableSchedule(String),
    #[error("间隔 {seconds} 秒不足整分钟，已按 {minutes} 分钟显示")]
    IntervalRounded { seconds: u64, minutes: u64 },
    #[error("未找到指定任务: {0}")]
    TaskNotFound(String),
    #[error("没有待确认的删除操作")]
    NoPendingDelete,
    #[error("当前版本仅支持一个群聊配置")]
    GroupLimit,
    #[error("未找到群聊配置: {0}")]
    GroupNotFound(String),
    #[error("请输入触发词")]
    EmptyTrigger,
    #[error("触发词已存在: {0}")]
    DuplicateTrigger(String),
    #[error("触发词序号无效: {0}")]
    TriggerIndex(usize),
    #[error("导入配置失败: {0}")]
    Import(String),
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every notice for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub notices: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl RecordingNotifier {
        pub fn last(&self) -> Option<(NoticeLevel, String)> {
            self.notices.lock().unwrap().last().cloned()
        }

        pub fn count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }
}
