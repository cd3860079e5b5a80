//! Configuration export and import files.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::FormError;

pub const EXPORT_FILE_PREFIX: &str = "KouriChat_配置_";

/// `KouriChat_配置_<YYYY-MM-DD>.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// A rendered export, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    pub fn new(date: NaiveDate, config: &Map<String, Value>) -> Result<Self, FormError> {
        Ok(Self {
            file_name: export_file_name(date),
            contents: serde_json::to_string_pretty(config)?,
        })
    }
}

/// Parse an import file. Anything but a JSON object is rejected.
pub fn parse_import(text: &str) -> Result<Map<String, Value>, FormError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FormError::Import("文件内容不是配置对象".to_string())),
        Err(e) => Err(FormError::Import(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "KouriChat_配置_2025-03-07.json");
    }

    #[test]
    fn test_export_is_pretty() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut config = Map::new();
        config.insert("MODEL".into(), json!("gpt-4o"));
        let file = ExportFile::new(date, &config).unwrap();
        assert!(file.contents.contains("\n  \"MODEL\": \"gpt-4o\""));
    }

    #[test]
    fn test_parse_import() {
        let map = parse_import(r#"{"MODEL": "x", "TASKS": []}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert!(matches!(parse_import("[1, 2]"), Err(FormError::Import(_))));
        assert!(matches!(parse_import("nope"), Err(FormError::Import(_))));
    }
}
