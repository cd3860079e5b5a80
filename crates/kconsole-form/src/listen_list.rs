//! The listen list: chat users the bot answers.

use serde_json::Value;

use crate::ChatIdProvider;

/// Ordered, duplicate-free user names. Stored in the form as a comma string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenList {
    users: Vec<String>,
}

impl ListenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-joined form field.
    pub fn from_field(raw: &str) -> Self {
        let mut list = Self::new();
        for user in raw.split(',') {
            list.add(user);
        }
        list
    }

    /// Accepts an array of names, a comma string, or `{"value": ...}`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                let mut list = Self::new();
                for item in items {
                    match item {
                        Value::String(s) => {
                            list.add(s);
                        }
                        Value::Null => {}
                        other => {
                            list.add(&other.to_string());
                        }
                    }
                }
                list
            }
            Value::String(s) => Self::from_field(s),
            Value::Object(map) => map.get("value").map(Self::from_value).unwrap_or_default(),
            _ => Self::new(),
        }
    }

    /// Add a trimmed, non-empty, not-yet-listed name. Returns whether it was added.
    pub fn add(&mut self, user: &str) -> bool {
        let user = user.trim();
        if user.is_empty() || self.contains(user) {
            return false;
        }
        self.users.push(user.to_string());
        true
    }

    pub fn remove(&mut self, user: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u != user.trim());
        before != self.users.len()
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.iter().any(|u| u == user)
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn to_field(&self) -> String {
        self.users.join(",")
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.users.iter().cloned().map(Value::String).collect())
    }
}

impl ChatIdProvider for ListenList {
    fn chat_ids(&self) -> Vec<String> {
        self.users.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_field_trims_and_dedupes() {
        let list = ListenList::from_field(" alice, bob,,alice ,carol ");
        assert_eq!(list.users(), ["alice", "bob", "carol"]);
        assert_eq!(list.to_field(), "alice,bob,carol");
    }

    #[test]
    fn test_from_value_shapes() {
        assert_eq!(ListenList::from_value(&json!(["a", "b"])).len(), 2);
        assert_eq!(ListenList::from_value(&json!("a,b,c")).len(), 3);
        assert_eq!(ListenList::from_value(&json!({"value": ["x"]})).users(), ["x"]);
        assert!(ListenList::from_value(&json!(42)).is_empty());
    }

    #[test]
    fn test_add_remove() {
        let mut list = ListenList::new();
        assert!(list.add("alice"));
        assert!(!list.add("alice"));
        assert!(!list.add("   "));
        assert!(list.remove("alice"));
        assert!(!list.remove("alice"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_chat_ids_follow_order() {
        let list = ListenList::from_field("b,a");
        assert_eq!(list.chat_ids(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(list.to_value(), json!(["b", "a"]));
    }
}
