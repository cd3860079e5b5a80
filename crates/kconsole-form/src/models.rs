//! Chat and vision model selection against the model catalog.

use once_cell::sync::Lazy;

use kconsole_types::{ModelCatalog, ModelEntry, VisionProvider};

/// Option value meaning "the model is typed in by hand".
pub const CUSTOM_MODEL: &str = "custom";
const CUSTOM_LABEL: &str = "自定义模型";

/// Catalog used when the server's catalog is unavailable.
pub static BUILTIN_CATALOG: Lazy<ModelCatalog> = Lazy::new(|| {
    let mut catalog = ModelCatalog {
        version: Some("1.4.1".to_string()),
        ..ModelCatalog::default()
    };
    catalog.models.insert(
        "kourichat-global".into(),
        vec![
            ModelEntry::new("gemini-2.5-flash", "gemini-2.5-flash"),
            ModelEntry::new("gemini-2.5-pro", "gemini-2.5-pro"),
            ModelEntry::new("kourichat-v3", "kourichat-v3"),
            ModelEntry::new("gpt-4o", "gpt-4o"),
            ModelEntry::new("grok-3", "grok-3"),
        ],
    );
    catalog.models.insert(
        "siliconflow".into(),
        vec![
            ModelEntry::new("deepseek-ai/DeepSeek-V3", "deepseek-ai/DeepSeek-V3"),
            ModelEntry::new("deepseek-ai/DeepSeek-R1", "deepseek-ai/DeepSeek-R1"),
        ],
    );
    catalog.models.insert(
        "deepseek".into(),
        vec![
            ModelEntry::new("deepseek-chat", "deepseek-chat"),
            ModelEntry::new("deepseek-reasoner", "deepseek-reasoner"),
        ],
    );
    catalog.vision_api_providers = vec![
        vision_provider(
            "kourichat-global",
            "KouriChat API (推荐)",
            "https://api.kourichat.com/v1",
            "https://api.kourichat.com/register",
        ),
        vision_provider(
            "moonshot",
            "Moonshot AI",
            "https://api.moonshot.cn/v1",
            "https://platform.moonshot.cn/console/api-keys",
        ),
        vision_provider(
            "openai",
            "OpenAI",
            "https://api.openai.com/v1",
            "https://platform.openai.com/api-keys",
        ),
    ];
    catalog.vision_models.insert(
        "kourichat-global".into(),
        vec![
            ModelEntry::new("kourichat-vision", "KouriChat Vision (推荐)"),
            ModelEntry::new("gemini-2.5-pro", "Gemini 2.5 Pro"),
            ModelEntry::new("gpt-4o", "GPT-4o"),
        ],
    );
    catalog.vision_models.insert(
        "moonshot".into(),
        vec![
            ModelEntry::new("moonshot-v1-8k-vision-preview", "Moonshot V1 8K Vision (推荐)"),
            ModelEntry::new("moonshot-v1-32k-vision", "Moonshot V1 32K Vision"),
        ],
    );
    catalog.vision_models.insert(
        "openai".into(),
        vec![
            ModelEntry::new("gpt-4o", "GPT-4o (推荐)"),
            ModelEntry::new("gpt-4-vision-preview", "GPT-4 Vision"),
        ],
    );
    catalog
});

static CHAT_FALLBACK: Lazy<Vec<ModelEntry>> = Lazy::new(|| {
    vec![
        ModelEntry::new("gpt-4o", "GPT-4o"),
        ModelEntry::new("claude-3-5-sonnet", "Claude 3.5 Sonnet"),
        ModelEntry::new("gemini-2.5-pro", "Gemini 2.5 Pro"),
    ]
});

static VISION_FALLBACK: Lazy<Vec<ModelEntry>> = Lazy::new(|| {
    vec![
        ModelEntry::new("gpt-4o", "GPT-4o Vision"),
        ModelEntry::new("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet Vision"),
        ModelEntry::new("gemini-2.5-pro", "Gemini 2.5 Pro Vision"),
        ModelEntry::new("kourichat-vision", "KouriChat Vision"),
    ]
});

fn vision_provider(id: &str, name: &str, url: &str, register_url: &str) -> VisionProvider {
    VisionProvider {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        register_url: register_url.to_string(),
    }
}

/// A catalog is usable if it lists chat or vision models.
pub fn is_usable(catalog: &ModelCatalog) -> bool {
    !catalog.models.is_empty() || !catalog.vision_models.is_empty()
}

/// State of a model picker after resolving the stored model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Offered models, always ending with the custom option.
    pub options: Vec<ModelEntry>,
    /// Selected option value (`custom` for hand-typed models).
    pub selected: String,
    /// Value to store as the model setting.
    pub model: String,
}

impl ModelSelection {
    pub fn is_custom(&self) -> bool {
        self.selected == CUSTOM_MODEL
    }

    fn custom(options: Vec<ModelEntry>, model: &str) -> Self {
        Self {
            options,
            selected: CUSTOM_MODEL.to_string(),
            model: model.to_string(),
        }
    }
}

fn with_custom(mut options: Vec<ModelEntry>) -> Vec<ModelEntry> {
    if !options.iter().any(|m| m.id == CUSTOM_MODEL) {
        options.push(ModelEntry::new(CUSTOM_MODEL, CUSTOM_LABEL));
    }
    options
}

/// Resolve the chat model picker for `provider` given the stored model.
pub fn chat_model_selection(catalog: &ModelCatalog, provider: &str, current: &str) -> ModelSelection {
    let listed = match catalog.models.get(provider) {
        Some(models) if !models.is_empty() => models.clone(),
        _ => {
            tracing::debug!(provider, "No catalog models for provider, using fallback list");
            CHAT_FALLBACK.clone()
        }
    };
    let options = with_custom(listed);
    let current = current.trim();

    if provider == "ollama" || provider == CUSTOM_MODEL {
        return ModelSelection::custom(options, current);
    }
    if !current.is_empty() {
        if options.iter().any(|m| m.id == current) {
            return ModelSelection {
                options,
                selected: current.to_string(),
                model: current.to_string(),
            };
        }
        return ModelSelection::custom(options, current);
    }
    let first = options[0].id.clone();
    ModelSelection {
        options,
        model: first.clone(),
        selected: first,
    }
}

/// Resolve the image-recognition model picker.
pub fn vision_model_selection(catalog: &ModelCatalog, provider: &str, current: &str) -> ModelSelection {
    let current = current.trim();
    if provider.trim().is_empty() || provider == CUSTOM_MODEL {
        return ModelSelection::custom(with_custom(Vec::new()), current);
    }

    let listed = match catalog.vision_models.get(provider) {
        Some(models) if !models.is_empty() => models.clone(),
        _ => {
            tracing::debug!(provider, "No catalog vision models for provider, using fallback list");
            VISION_FALLBACK.clone()
        }
    };
    let options = with_custom(listed);

    if !current.is_empty() && current != CUSTOM_MODEL && options.iter().any(|m| m.id == current) {
        return ModelSelection {
            options,
            selected: current.to_string(),
            model: current.to_string(),
        };
    }
    if !current.is_empty() {
        return ModelSelection::custom(options, current);
    }
    let first = options[0].id.clone();
    let model = if first == CUSTOM_MODEL { String::new() } else { first.clone() };
    ModelSelection {
        options,
        selected: first,
        model,
    }
}
