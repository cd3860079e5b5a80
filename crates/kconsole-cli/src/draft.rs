//! The draft file: form fields kept between commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use kconsole_config::ConsoleConfig;
use kconsole_form::{ConfigForm, ConsoleSession, Notifier};

/// Read the draft. A missing or unreadable draft yields an empty form.
pub fn load_form(path: &Path) -> ConfigForm {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("No draft at {}: {e}", path.display());
            return ConfigForm::new();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring malformed draft {}: {e}", path.display());
        ConfigForm::new()
    })
}

pub fn save_form(path: &Path, form: &ConfigForm) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(form)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write draft {}", path.display()))?;
    Ok(())
}

/// A session bound to its draft file.
pub struct Draft {
    pub path: PathBuf,
    pub session: ConsoleSession,
}

impl Draft {
    pub fn open(config: &ConsoleConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let path = config.draft_file().context("Failed to resolve draft path")?;
        Ok(Self::open_at(path, notifier))
    }

    pub fn open_at(path: PathBuf, notifier: Arc<dyn Notifier>) -> Self {
        let session = ConsoleSession::new(load_form(&path), notifier);
        Self { path, session }
    }

    pub fn save(&self) -> Result<()> {
        save_form(&self.path, &self.session.form_snapshot()?)
    }
}
