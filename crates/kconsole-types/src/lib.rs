use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ──────────────────── Task Types ────────────────────

/// Which field of a [`TaskRecord`] carries the timing rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    /// `schedule_time` is a 5-field cron expression.
    #[default]
    Cron,
    /// `schedule_time` is a number of seconds.
    Interval,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Cron => "cron",
            ScheduleType::Interval => "interval",
        }
    }
}

impl std::str::FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cron" => Ok(ScheduleType::Cron),
            "interval" => Ok(ScheduleType::Interval),
            other => Err(format!("unknown schedule type: {other}")),
        }
    }
}

/// A scheduled message, as persisted in the `TASKS` config entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Operator-chosen identifier, unique within the task list.
    pub task_id: String,
    /// Recipient, one of the listen-list users.
    pub chat_id: String,
    /// Message payload.
    pub content: String,
    pub schedule_type: ScheduleType,
    /// Cron expression or total seconds, depending on `schedule_type`.
    pub schedule_time: String,
    /// Legacy mirror of `schedule_time` for interval tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl TaskRecord {
    /// The seconds string of an interval task.
    ///
    /// `schedule_time` is authoritative; `interval` is only consulted when
    /// `schedule_time` is empty.
    pub fn interval_seconds(&self) -> Option<&str> {
        if self.schedule_type != ScheduleType::Interval {
            return None;
        }
        let primary = self.schedule_time.trim();
        if !primary.is_empty() {
            return Some(primary);
        }
        self.interval.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether the legacy `interval` mirror disagrees with `schedule_time`.
    pub fn interval_diverges(&self) -> bool {
        match (&self.schedule_type, &self.interval) {
            (ScheduleType::Interval, Some(mirror)) => {
                !self.schedule_time.trim().is_empty() && mirror.trim() != self.schedule_time.trim()
            }
            _ => false,
        }
    }
}

// ──────────────────── Group Chat Types ────────────────────

/// Trigger settings for the single supported group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChatConfig {
    pub id: String,
    #[serde(rename = "groupName", default)]
    pub group_name: String,
    /// Persona directory used for replies in this group.
    #[serde(default)]
    pub avatar: String,
    /// Words that trigger a reply when they appear in a group message.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Whether mentioning the bot by name also triggers a reply.
    #[serde(rename = "enableAtTrigger", default = "default_true")]
    pub enable_at_trigger: bool,
}

// ──────────────────── Endpoint Types ────────────────────

/// `status` field shared by every backend response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Config groups as served by `/get_all_configs`: group → key → value.
///
/// A value is either the raw setting or an object with `value`/`default`.
pub type ConfigGroups = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Response of `GET /get_all_configs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllConfigsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub configs: ConfigGroups,
    /// Kept untyped so a malformed task list can be dropped without failing the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /get_background`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundResponse {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response of `POST /save`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub message: String,
}

// ──────────────────── Model Catalog Types ────────────────────

/// One selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelEntry {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
        }
    }

    /// Display label, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// An image-recognition API provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionProvider {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub register_url: String,
}

/// Static catalog of chat and vision models per provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub models: BTreeMap<String, Vec<ModelEntry>>,
    #[serde(default)]
    pub vision_api_providers: Vec<VisionProvider>,
    #[serde(default)]
    pub vision_models: BTreeMap<String, Vec<ModelEntry>>,
}

// ──────────────────── Notice Types ────────────────────

/// Severity of an operator-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

fn default_true() -> bool {
    true
}
