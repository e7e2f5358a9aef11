//! Backend provider info
//!
//! The backend reports which text-generation provider it is using so the UI
//! can show a badge. The lookup never fails from the caller's point of view:
//! any error falls back to the local provider.
//!
//! The choice lives in the backend's HTTP session, so selection and every
//! later request must share one client with a cookie store.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, FetchError};
use crate::ui::Badge;

pub const PROVIDER_INFO_PATH: &str = "/api/provider-info";
pub const SELECT_PROVIDER_PATH: &str = "/provider";
pub const API_KEY_PATH: &str = "/api-key";

/// Provider assumed when the backend does not say
pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEEPSEEK_PROVIDER: &str = "deepseek";

/// Providers the backend knows
pub const PROVIDERS: [&str; 2] = [DEFAULT_PROVIDER, DEEPSEEK_PROVIDER];

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for ProviderInfo {
    fn default() -> Self {
        Self {
            provider: default_provider(),
        }
    }
}

impl ProviderInfo {
    /// Whether the backend runs the local model
    pub fn is_local(&self) -> bool {
        self.provider == DEFAULT_PROVIDER
    }
}

/// How the badge looks for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    pub label: &'static str,
    pub background: &'static str,
}

pub const LOCAL_BADGE: BadgeStyle = BadgeStyle {
    label: "🖥️ Local Ollama",
    background: "linear-gradient(135deg, #667eea, #764ba2)",
};

pub const REMOTE_BADGE: BadgeStyle = BadgeStyle {
    label: "☁️ Remote DeepSeek",
    background: "linear-gradient(135deg, #f093fb, #f5576c)",
};

impl BadgeStyle {
    pub fn for_info(info: &ProviderInfo) -> Self {
        if info.is_local() {
            LOCAL_BADGE
        } else {
            REMOTE_BADGE
        }
    }
}

/// Where provider info comes from
#[async_trait]
pub trait ProviderInfoSource: Send + Sync {
    async fn provider_info(&self) -> Result<ProviderInfo, FetchError>;
}

/// Provider choice to store in the backend session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    pub provider: String,
    /// Only used by the remote provider
    pub api_key: Option<String>,
}

impl ProviderSelection {
    pub fn new(provider: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key,
        }
    }
}

/// Talks to the backend's provider endpoints
#[derive(Debug, Clone)]
pub struct HttpProviderSource {
    client: Client,
    base_url: Url,
}

impl HttpProviderSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<(), FetchError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(())
    }

    /// Store the provider (and its API key, if any) in the backend session
    pub async fn select_provider(&self, selection: &ProviderSelection) -> Result<(), FetchError> {
        info!("Selecting provider: {}", selection.provider);
        self.post_form(SELECT_PROVIDER_PATH, &[("provider", selection.provider.as_str())])
            .await?;
        if let Some(api_key) = &selection.api_key {
            self.post_form(API_KEY_PATH, &[("apiKey", api_key.as_str())]).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderInfoSource for HttpProviderSource {
    async fn provider_info(&self) -> Result<ProviderInfo, FetchError> {
        let url = self.endpoint(PROVIDER_INFO_PATH)?;
        debug!("Fetching provider info from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Provider info, or the local default on any failure
pub async fn fetch_provider_info(source: &dyn ProviderInfoSource) -> ProviderInfo {
    match source.provider_info().await {
        Ok(info) => info,
        Err(e) => {
            warn!("Failed to fetch provider info, using default: {}", e);
            ProviderInfo::default()
        }
    }
}

/// Fetch provider info and restyle `badge` to match
pub async fn update_provider_badge(
    source: &dyn ProviderInfoSource,
    badge: &dyn Badge,
) -> ProviderInfo {
    let info = fetch_provider_info(source).await;
    let style = BadgeStyle::for_info(&info);
    badge.set_label(style.label);
    badge.set_background(style.background);
    info
}
