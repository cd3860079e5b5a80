use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ServerConfig::base_url`].
pub const SERVER_URL_ENV: &str = "KCONSOLE_SERVER_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// Backend the console talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the configuration server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Path of the static model catalog on the server.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8502".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_catalog_path() -> String {
    "/static/models.json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            catalog_path: default_catalog_path(),
        }
    }
}

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Draft file holding the form state between commands.
    /// Defaults to `~/.kconsole/draft.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_path: Option<PathBuf>,
    /// Directory exports are written to. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    /// Persona directories offered for the group-chat avatar.
    #[serde(default)]
    pub avatar_dirs: Vec<String>,
}

impl ConsoleConfig {
    /// Resolve the draft file path.
    pub fn draft_file(&self) -> Result<PathBuf, ConfigError> {
        match &self.draft_path {
            Some(p) => Ok(p.clone()),
            None => Ok(config_dir()?.join("draft.json")),
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Server URL overridden by {SERVER_URL_ENV}");
                self.server.base_url = url.trim().to_string();
            }
        }
    }
}

/// Resolve the console config directory (~/.kconsole/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".kconsole"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.kconsole/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<ConsoleConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    let mut config = load_config_from(&path)?;
    config.apply_env();
    Ok(config)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(ConsoleConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: ConsoleConfig = json5::from_str(&content)?;
    Ok(config)
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Save configuration to a specific path.
pub fn save_config_to(config: &ConsoleConfig, path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8502");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.catalog_path, "/static/models.json");
        assert!(config.avatar_dirs.is_empty());
    }

    #[test]
    fn test_json5_parse() {
        let json5_str = r#"{
            server: { base_url: "http://10.0.0.2:9000", timeout_secs: 5 },
            avatar_dirs: ["data/avatars/ATRI", "data/avatars/MONO"],
            draft_path: "/tmp/draft.json",
        }"#;
        let config: ConsoleConfig = json5::from_str(json5_str).unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.catalog_path, "/static/models.json");
        assert_eq!(config.avatar_dirs.len(), 2);
        assert_eq!(
            config.draft_file().unwrap(),
            PathBuf::from("/tmp/draft.json")
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.json5")).unwrap();
        assert_eq!(config.server.base_url, default_base_url());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        let mut config = ConsoleConfig::default();
        config.server.base_url = "http://example.test".into();
        config.avatar_dirs.push("data/avatars/ATRI".into());
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://example.test");
        assert_eq!(loaded.avatar_dirs, vec!["data/avatars/ATRI".to_string()]);
    }

    #[test]
    fn test_invalid_json5_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        std::fs::write(&path, "{ server: ").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Json5(_))
        ));
    }
}
