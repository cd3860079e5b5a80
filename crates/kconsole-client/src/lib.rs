//! HTTP client for the configuration server.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use kconsole_config::ServerConfig;
use kconsole_types::{AllConfigsResponse, ApiStatus, BackgroundResponse, ModelCatalog, SaveResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {code}")]
    Status { code: u16, endpoint: String },
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("model catalog lists no models")]
    InvalidCatalog,
}

/// Client for `/get_all_configs`, `/get_background`, `/save` and the model catalog.
pub struct ConsoleApi {
    client: Client,
    base_url: String,
    catalog_path: String,
    catalog: OnceCell<ModelCatalog>,
}

impl ConsoleApi {
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            catalog_path: config.catalog_path.clone(),
            catalog: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                code: status.as_u16(),
                endpoint: path.to_string(),
            });
        }
        Ok(resp.json().await?)
    }

    /// Fetch every config group and the task list.
    pub async fn get_all_configs(&self) -> Result<AllConfigsResponse, ClientError> {
        let resp: AllConfigsResponse = self.get_json("/get_all_configs").await?;
        if resp.status != ApiStatus::Success {
            return Err(ClientError::Rejected(
                resp.message.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        debug!(groups = resp.configs.len(), "Fetched all configs");
        Ok(resp)
    }

    /// Path of the configured background image, if any.
    pub async fn get_background(&self) -> Result<Option<String>, ClientError> {
        let resp: BackgroundResponse = self.get_json("/get_background").await?;
        if resp.status != ApiStatus::Success {
            return Ok(None);
        }
        Ok(resp.path.filter(|p| !p.is_empty()))
    }

    /// Submit the full config map. Returns the server's message.
    pub async fn save(&self, config: &Map<String, Value>) -> Result<String, ClientError> {
        let resp = self.client.post(self.url("/save")).json(config).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                code: status.as_u16(),
                endpoint: "/save".into(),
            });
        }
        let body: SaveResponse = resp.json().await?;
        match body.status {
            ApiStatus::Success => Ok(body.message),
            _ => Err(ClientError::Rejected(body.message)),
        }
    }

    /// Fetch the model catalog, rejecting one without any models.
    pub async fn fetch_model_catalog(&self) -> Result<ModelCatalog, ClientError> {
        let catalog: ModelCatalog = self.get_json(&self.catalog_path).await?;
        if catalog.models.is_empty() && catalog.vision_models.is_empty() {
            return Err(ClientError::InvalidCatalog);
        }
        Ok(catalog)
    }

    /// The model catalog, fetched once per client.
    ///
    /// A failed fetch caches `fallback()` instead.
    pub async fn model_catalog(&self, fallback: impl FnOnce() -> ModelCatalog) -> &ModelCatalog {
        self.catalog
            .get_or_init(|| async move {
                match self.fetch_model_catalog().await {
                    Ok(catalog) => catalog,
                    Err(e) => {
                        warn!("Failed to load model catalog, using built-in list: {e}");
                        fallback()
                    }
                }
            })
            .await
    }
}
