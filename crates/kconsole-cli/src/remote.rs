//! Commands that talk to the configuration server.

use anyhow::Result;
use tracing::{info, warn};

use kconsole_client::ConsoleApi;
use kconsole_form::models::{self, BUILTIN_CATALOG};
use kconsole_form::{ConsoleSession, Notifier};
use kconsole_types::NoticeLevel;

/// Replace the draft with the server's configuration.
///
/// On failure the local draft is kept and the error reported.
pub async fn pull(api: &ConsoleApi, session: &mut ConsoleSession, notifier: &dyn Notifier) -> bool {
    match api.get_all_configs().await {
        Ok(resp) => {
            session.apply_remote(&resp);
            notifier.notify(NoticeLevel::Success, "配置已加载");
            true
        }
        Err(e) => {
            warn!(url = %api.base_url(), "Failed to load configs: {e}");
            notifier.notify(NoticeLevel::Error, &format!("加载配置失败: {e}，继续使用本地草稿"));
            false
        }
    }
}

/// Submit the draft to `/save`.
pub async fn push(api: &ConsoleApi, session: &ConsoleSession, notifier: &dyn Notifier) -> Result<()> {
    let payload = session.collect()?;
    info!(keys = payload.len(), "Submitting configuration");
    match api.save(&payload).await {
        Ok(message) => {
            let message = if message.is_empty() { "配置已保存".to_string() } else { message };
            notifier.notify(NoticeLevel::Success, &message);
            Ok(())
        }
        Err(e) => {
            notifier.notify(NoticeLevel::Error, &format!("保存失败: {e}"));
            Err(e.into())
        }
    }
}

pub async fn background(api: &ConsoleApi) -> Result<()> {
    match api.get_background().await? {
        Some(path) => println!("{path}"),
        None => println!("未设置背景图片"),
    }
    Ok(())
}

/// Print the model picker for `provider`.
pub async fn model_options(
    api: &ConsoleApi,
    session: &ConsoleSession,
    provider: &str,
    vision: bool,
    current: Option<String>,
) -> Result<()> {
    let catalog = api.model_catalog(|| BUILTIN_CATALOG.clone()).await;
    let key = if vision { "VISION_MODEL" } else { "MODEL" };
    let current = current.unwrap_or_else(|| session.form().get(key).unwrap_or_default().to_string());

    let selection = if vision {
        models::vision_model_selection(catalog, provider, &current)
    } else {
        models::chat_model_selection(catalog, provider, &current)
    };
    for entry in &selection.options {
        let mark = if entry.id == selection.selected { "*" } else { " " };
        println!("{mark} {:<36} {}", entry.id, entry.label());
    }
    println!("{key} = {}", selection.model);
    Ok(())
}
