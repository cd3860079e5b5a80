//! Group-chat trigger configuration.

use serde_json::Value;
use tracing::warn;

use kconsole_types::GroupChatConfig;

use crate::FormError;

/// More than one group config confuses the bot's memory, so only one is allowed.
pub const MAX_GROUP_CONFIGS: usize = 1;

/// A selectable persona directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarOption {
    pub value: String,
    pub label: String,
}

/// Persona choices for the avatar picker, labelled by their last path segment.
pub fn avatar_options(dirs: &[String]) -> Vec<AvatarOption> {
    dirs.iter()
        .filter(|d| !d.trim().is_empty())
        .map(|d| AvatarOption {
            value: d.clone(),
            label: d.rsplit('/').next().unwrap_or(d).to_string(),
        })
        .collect()
}

/// Editable field of a group config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupField {
    GroupName(String),
    Avatar(String),
    EnableAtTrigger(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChatEditor {
    configs: Vec<GroupChatConfig>,
}

impl GroupChatEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the serialized `GROUP_CHAT_CONFIG` field; malformed data yields none.
    pub fn deserialize(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Failed to parse group chat config: {e}");
                Self::new()
            }
        }
    }

    /// Non-array values yield none; invalid entries are skipped.
    pub fn from_value(value: Value) -> Self {
        let Value::Array(items) = value else {
            if !value.is_null() {
                warn!("Group chat config is not an array, ignoring");
            }
            return Self::new();
        };
        let configs = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<GroupChatConfig>(item) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Skipping malformed group chat config: {e}");
                    None
                }
            })
            .collect();
        Self { configs }
    }

    pub fn serialize(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.configs)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.configs)
    }

    pub fn configs(&self) -> &[GroupChatConfig] {
        &self.configs
    }

    pub fn get(&self, id: &str) -> Option<&GroupChatConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    pub fn can_add(&self) -> bool {
        self.configs.len() < MAX_GROUP_CONFIGS
    }

    /// Append an empty config with `@` triggering on.
    pub fn add(&mut self) -> Result<&GroupChatConfig, FormError> {
        if !self.can_add() {
            return Err(FormError::GroupLimit);
        }
        self.configs.push(GroupChatConfig {
            id: format!("group_{}", chrono::Utc::now().timestamp_millis()),
            group_name: String::new(),
            avatar: String::new(),
            triggers: Vec::new(),
            enable_at_trigger: true,
        });
        Ok(&self.configs[self.configs.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.configs.len();
        self.configs.retain(|c| c.id != id);
        before != self.configs.len()
    }

    pub fn set_field(&mut self, id: &str, field: GroupField) -> Result<(), FormError> {
        let config = self.get_mut(id)?;
        match field {
            GroupField::GroupName(name) => config.group_name = name.trim().to_string(),
            GroupField::Avatar(avatar) => config.avatar = avatar.trim().to_string(),
            GroupField::EnableAtTrigger(on) => config.enable_at_trigger = on,
        }
        Ok(())
    }

    pub fn add_trigger(&mut self, id: &str, word: &str) -> Result<(), FormError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(FormError::EmptyTrigger);
        }
        let config = self.get_mut(id)?;
        if config.triggers.iter().any(|t| t == word) {
            return Err(FormError::DuplicateTrigger(word.to_string()));
        }
        config.triggers.push(word.to_string());
        Ok(())
    }

    /// Remove the trigger at `index`, returning it.
    pub fn remove_trigger_at(&mut self, id: &str, index: usize) -> Result<String, FormError> {
        let config = self.get_mut(id)?;
        if index >= config.triggers.len() {
            return Err(FormError::TriggerIndex(index));
        }
        Ok(config.triggers.remove(index))
    }

    pub fn remove_trigger(&mut self, id: &str, word: &str) -> Result<bool, FormError> {
        let config = self.get_mut(id)?;
        let before = config.triggers.len();
        config.triggers.retain(|t| t != word);
        Ok(before != config.triggers.len())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut GroupChatConfig, FormError> {
        self.configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FormError::GroupNotFound(id.to_string()))
    }
}
