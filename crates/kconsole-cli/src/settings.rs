//! Local edits: listen list, group chat, plain fields, import and export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use kconsole_config::ConsoleConfig;
use kconsole_form::ConsoleSession;
use kconsole_form::group_chat::{GroupField, avatar_options};

/// Write `config` to `path` unless a file is already there.
/// Returns whether the file was written.
pub fn init_config(config: &ConsoleConfig, path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    kconsole_config::save_config_to(config, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

pub fn list_users(session: &ConsoleSession) {
    for user in session.listen_list().users() {
        println!("{user}");
    }
}

pub fn show_groups(session: &ConsoleSession, avatar_dirs: &[String]) {
    let configs = session.groups().configs();
    if configs.is_empty() {
        println!("暂无群聊配置");
    }
    for config in configs {
        println!("{}", config.id);
        println!("  群名称: {}", config.group_name);
        println!("  人设:   {}", config.avatar);
        println!("  @触发:  {}", if config.enable_at_trigger { "开启" } else { "关闭" });
        for (i, word) in config.triggers.iter().enumerate() {
            println!("  [{i}] {word}");
        }
    }
    let options = avatar_options(avatar_dirs);
    if !options.is_empty() {
        println!("可选人设:");
        for option in options {
            println!("  {:<16} {}", option.label, option.value);
        }
    }
}

pub fn set_group(
    session: &mut ConsoleSession,
    id: &str,
    name: Option<String>,
    avatar: Option<String>,
    at_trigger: Option<bool>,
) -> Result<()> {
    if let Some(name) = name {
        session.set_group_field(id, GroupField::GroupName(name))?;
    }
    if let Some(avatar) = avatar {
        session.set_group_field(id, GroupField::Avatar(avatar))?;
    }
    if let Some(on) = at_trigger {
        session.set_group_field(id, GroupField::EnableAtTrigger(on))?;
    }
    Ok(())
}

/// Write the export file into `dir`, returning its path.
pub fn export(session: &ConsoleSession, dir: &Path) -> Result<PathBuf> {
    let file = session.export(chrono::Local::now().date_naive())?;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, file.contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn import(session: &mut ConsoleSession, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(session.import_str(&text)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kconsole_form::{ConfigForm, TracingNotifier};

    use super::*;

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ConsoleSession::new(ConfigForm::new(), Arc::new(TracingNotifier));
        source.set_field("MODEL", "gpt-4o");
        source.add_user("alice");
        let id = source.add_group().unwrap();
        set_group(&mut source, &id, Some("fans".into()), None, Some(false)).unwrap();

        let path = export(&source, dir.path()).unwrap();
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("KouriChat_配置_")
        );

        let mut target = ConsoleSession::new(ConfigForm::new(), Arc::new(TracingNotifier));
        import(&mut target, &path).unwrap();
        assert_eq!(target.form().get("MODEL"), Some("gpt-4o"));
        assert_eq!(target.listen_list().users(), ["alice"]);
        assert_eq!(target.groups().configs()[0].group_name, "fans");
        assert!(!target.groups().configs()[0].enable_at_trigger);
    }

    #[test]
    fn test_init_config_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        let mut config = ConsoleConfig::default();
        config.server.base_url = "http://10.0.0.2:9000".into();
        assert!(init_config(&config, &path, false).unwrap());
        let loaded = kconsole_config::load_config_from(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://10.0.0.2:9000");

        config.server.base_url = "http://10.0.0.3:9000".into();
        assert!(!init_config(&config, &path, false).unwrap());
        let loaded = kconsole_config::load_config_from(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://10.0.0.2:9000");

        assert!(init_config(&config, &path, true).unwrap());
        let loaded = kconsole_config::load_config_from(&path).unwrap();
        assert_eq!(loaded.server.base_url, "http://10.0.0.3:9000");
    }

    #[test]
    fn test_set_group_unknown_id() {
        let mut s = ConsoleSession::new(ConfigForm::new(), Arc::new(TracingNotifier));
        assert!(set_group(&mut s, "missing", Some("x".into()), None, None).is_err());
    }
}
