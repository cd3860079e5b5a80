//! Raw configuration form values and their conversion to the save payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use kconsole_cron::TaskListStore;
use kconsole_types::ConfigGroups;

use crate::group_chat::GroupChatEditor;

pub const TASKS_KEY: &str = "TASKS";
pub const GROUP_CHAT_KEY: &str = "GROUP_CHAT_CONFIG";
pub const LISTEN_LIST_KEY: &str = "LISTEN_LIST";

/// Settings submitted as numbers.
pub const NUMERIC_KEYS: &[&str] = &[
    "TEMPERATURE",
    "VISION_TEMPERATURE",
    "MAX_TOKEN",
    "MIN_COUNTDOWN_HOURS",
    "MAX_COUNTDOWN_HOURS",
    "MAX_GROUPS",
    "QUEUE_TIMEOUT",
];
/// Numeric settings rounded to whole numbers.
pub const INTEGER_KEYS: &[&str] = &["MAX_TOKEN", "MAX_GROUPS", "QUEUE_TIMEOUT"];
/// Switches that are always submitted as booleans.
pub const SWITCH_KEYS: &[&str] = &["NETWORK_SEARCH_ENABLED", "WEBLENS_ENABLED"];
/// Sliders shown with one decimal place.
pub const TEMPERATURE_KEYS: &[&str] = &["TEMPERATURE", "VISION_TEMPERATURE"];

/// Form field values by setting key, as the operator typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigForm {
    fields: BTreeMap<String, String>,
}

impl ConfigForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Set a field. Temperatures are normalized to one decimal place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let mut value = value.into();
        if TEMPERATURE_KEYS.contains(&key) {
            if let Some(n) = parse_number(&value) {
                value = format!("{:.1}", (n * 10.0).round() / 10.0);
            }
        }
        self.fields.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Set a field from a JSON value, the way it would appear in an input.
    pub fn set_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.set(key, s.as_str()),
            Value::Bool(b) => self.set(key, b.to_string()),
            Value::Number(n) => self.set(key, n.to_string()),
            Value::Array(items) if key == LISTEN_LIST_KEY => {
                let users: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))
                    .map(String::from)
                    .collect();
                self.set(key, users.join(","));
            }
            other => self.set(key, other.to_string()),
        }
    }

    /// Fill fields from `/get_all_configs` groups.
    ///
    /// Object entries contribute their `value`, else their `default`.
    pub fn apply_server_configs(&mut self, groups: &ConfigGroups) {
        for settings in groups.values() {
            for (key, raw) in settings {
                let value = match raw {
                    Value::Object(obj) => obj
                        .get("value")
                        .filter(|v| !v.is_null())
                        .or_else(|| obj.get("default"))
                        .cloned()
                        .unwrap_or(Value::Null),
                    other => other.clone(),
                };
                tracing::debug!(key = %key, "Applying server config");
                self.set_value(key, &value);
            }
        }
    }

    /// Build the `/save` payload from the current fields.
    pub fn collect(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, raw) in &self.fields {
            out.insert(key.clone(), convert_field(key, raw));
        }
        out
    }
}

/// A finite number, or `None`. `NaN` and infinities stay text.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn convert_field(key: &str, raw: &str) -> Value {
    if key == LISTEN_LIST_KEY {
        return Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        );
    }
    if key == TASKS_KEY {
        return TaskListStore::deserialize(raw)
            .to_value()
            .unwrap_or_else(|_| Value::Array(Vec::new()));
    }
    if key == GROUP_CHAT_KEY {
        return GroupChatEditor::deserialize(raw)
            .to_value()
            .unwrap_or_else(|_| Value::Array(Vec::new()));
    }
    if NUMERIC_KEYS.contains(&key) {
        if let Some(n) = parse_number(raw) {
            if INTEGER_KEYS.contains(&key) {
                return Value::Number(Number::from(n.round() as i64));
            }
            if let Some(num) = Number::from_f64(n) {
                return Value::Number(num);
            }
        }
        return Value::String(raw.to_string());
    }
    if SWITCH_KEYS.contains(&key) {
        return Value::Bool(raw.trim().eq_ignore_ascii_case("true"));
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}
