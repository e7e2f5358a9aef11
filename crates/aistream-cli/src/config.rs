//! Config file for the command-line front end
//!
//! ```toml
//! base_url = "http://localhost:8080"
//! provider = "deepseek"
//! api_key = "sk-..."
//!
//! [chat]
//! timeout_ms = 60000
//!
//! [translate]
//! busy_label = "Working..."
//! ```

use std::path::{Path, PathBuf};

use aistream_core::provider::ProviderSelection;
use aistream_core::{SessionConfig, SessionOverrides};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Sentinel the backend sends as its last data frame
pub const BACKEND_DONE_SENTINEL: &str = "[DONE]";

/// Which widget a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Chat,
    Translate,
    Weather,
}

impl Widget {
    fn preset(self) -> SessionConfig {
        match self {
            Widget::Chat => SessionConfig::chat(),
            Widget::Translate => SessionConfig::translate(),
            Widget::Weather => SessionConfig::weather(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub base_url: Option<String>,
    /// Provider to select in the backend session before each command
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub chat: SessionOverrides,
    pub translate: SessionOverrides,
    pub weather: SessionOverrides,
}

impl CliConfig {
    /// `<config dir>/aistream/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aistream").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Flag first, then file, then the built-in default
    pub fn base_url(&self, flag: Option<&str>) -> String {
        flag.or(self.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    /// Provider choice from flags, then the file; `None` keeps the backend default
    pub fn provider_selection(
        &self,
        provider: Option<&str>,
        api_key: Option<&str>,
    ) -> Option<ProviderSelection> {
        let provider = provider.or(self.provider.as_deref())?;
        let api_key = api_key.or(self.api_key.as_deref()).map(str::to_string);
        Some(ProviderSelection::new(provider, api_key))
    }

    /// Preset for `widget` with file overrides and the timeout flag applied
    pub fn session_config(&self, widget: Widget, timeout_ms: Option<i64>) -> SessionConfig {
        let mut base = widget.preset();
        base.done_sentinel = Some(BACKEND_DONE_SENTINEL.to_string());

        let overrides = match widget {
            Widget::Chat => &self.chat,
            Widget::Translate => &self.translate,
            Widget::Weather => &self.weather,
        };
        let mut config = overrides.clone().apply(base);
        if let Some(ms) = timeout_ms {
            config.timeout_ms = ms;
        }
        config
    }
}
