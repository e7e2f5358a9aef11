//! Session configuration
//!
//! `SessionConfig` is fixed when a [`StreamSession`](crate::StreamSession) is
//! built. Every field has a documented default; the per-widget presets only
//! change the endpoint and the submit-control labels.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default stream timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: i64 = 30_000;

/// Delay before the "complete" status text is cleared
pub const DEFAULT_STATUS_CLEAR_DELAY_MS: u64 = 3_000;

/// How appended chunks are handed to the content sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupTrust {
    /// Chunks are inserted as plain text
    #[default]
    Escaped,
    /// Chunks are inserted as markup; only for trusted backends
    Raw,
}

/// Submit-control labels for the idle and busy states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLabels {
    pub idle: String,
    pub busy: String,
}

impl ButtonLabels {
    pub fn chat() -> Self {
        Self {
            idle: "Send".to_string(),
            busy: "Sending...".to_string(),
        }
    }

    pub fn translate() -> Self {
        Self {
            idle: "🔄 Translate".to_string(),
            busy: "Translating...".to_string(),
        }
    }

    pub fn weather() -> Self {
        Self {
            idle: "🔍 Check weather".to_string(),
            busy: "Querying...".to_string(),
        }
    }
}

impl Default for ButtonLabels {
    fn default() -> Self {
        Self::chat()
    }
}

/// Status-line texts shown during the stream lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTexts {
    pub connecting: String,
    pub connected: String,
    pub error: String,
    pub complete: String,
}

impl Default for StatusTexts {
    fn default() -> Self {
        Self {
            connecting: "Connecting...".to_string(),
            connected: "Connected, receiving reply...".to_string(),
            error: "Connection error, please retry".to_string(),
            complete: "Done".to_string(),
        }
    }
}

/// Configuration for a stream session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Endpoint path (or absolute URL) used when `start_stream` gets no override
    pub endpoint: String,
    /// Query parameter carrying a chat message
    pub message_param: String,
    pub button_labels: ButtonLabels,
    pub status_texts: StatusTexts,
    /// Scroll the container to the bottom after every chunk
    pub auto_scroll: bool,
    /// Create a fresh `aiResponse_<n>` bubble per stream
    pub message_counter: bool,
    /// Repair missing word separators between token chunks
    pub smart_spacing: bool,
    pub markup: MarkupTrust,
    /// Append `error_message` to the result sink on failure
    pub show_error_in_result: bool,
    pub error_message: String,
    /// Stream timeout; zero or negative disables it
    pub timeout_ms: i64,
    pub status_clear_delay_ms: u64,
    /// Unnamed message payload treated as a terminal event (e.g. `[DONE]`)
    pub done_sentinel: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "/chat/stream".to_string(),
            message_param: "message".to_string(),
            button_labels: ButtonLabels::default(),
            status_texts: StatusTexts::default(),
            auto_scroll: true,
            message_counter: false,
            smart_spacing: true,
            markup: MarkupTrust::Escaped,
            show_error_in_result: true,
            error_message: "Request failed, please retry".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            status_clear_delay_ms: DEFAULT_STATUS_CLEAR_DELAY_MS,
            done_sentinel: None,
        }
    }
}

impl SessionConfig {
    /// Chat widget: counted message bubbles on `/chat/stream`
    pub fn chat() -> Self {
        Self {
            message_counter: true,
            ..Self::default()
        }
    }

    pub fn translate() -> Self {
        Self {
            endpoint: "/translate/stream".to_string(),
            button_labels: ButtonLabels::translate(),
            ..Self::default()
        }
    }

    pub fn weather() -> Self {
        Self {
            endpoint: "/weather/stream".to_string(),
            button_labels: ButtonLabels::weather(),
            ..Self::default()
        }
    }

    /// The stream timeout, or `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.message_param.trim().is_empty() {
            return Err(ConfigError::EmptyMessageParam);
        }
        if self.done_sentinel.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::EmptyDoneSentinel);
        }
        Ok(())
    }
}

/// Partial configuration layered over a preset (config file tables)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOverrides {
    pub endpoint: Option<String>,
    pub message_param: Option<String>,
    pub idle_label: Option<String>,
    pub busy_label: Option<String>,
    pub status_texts: Option<StatusTexts>,
    pub auto_scroll: Option<bool>,
    pub message_counter: Option<bool>,
    pub smart_spacing: Option<bool>,
    pub markup: Option<MarkupTrust>,
    pub show_error_in_result: Option<bool>,
    pub error_message: Option<String>,
    pub timeout_ms: Option<i64>,
    pub status_clear_delay_ms: Option<u64>,
    pub done_sentinel: Option<String>,
}

impl SessionOverrides {
    /// Apply the set fields on top of `base`
    pub fn apply(self, mut base: SessionConfig) -> SessionConfig {
        if let Some(endpoint) = self.endpoint {
            base.endpoint = endpoint;
        }
        if let Some(param) = self.message_param {
            base.message_param = param;
        }
        if let Some(label) = self.idle_label {
            base.button_labels.idle = label;
        }
        if let Some(label) = self.busy_label {
            base.button_labels.busy = label;
        }
        if let Some(texts) = self.status_texts {
            base.status_texts = texts;
        }
        if let Some(v) = self.auto_scroll {
            base.auto_scroll = v;
        }
        if let Some(v) = self.message_counter {
            base.message_counter = v;
        }
        if let Some(v) = self.smart_spacing {
            base.smart_spacing = v;
        }
        if let Some(v) = self.markup {
            base.markup = v;
        }
        if let Some(v) = self.show_error_in_result {
            base.show_error_in_result = v;
        }
        if let Some(msg) = self.error_message {
            base.error_message = msg;
        }
        if let Some(ms) = self.timeout_ms {
            base.timeout_ms = ms;
        }
        if let Some(ms) = self.status_clear_delay_ms {
            base.status_clear_delay_ms = ms;
        }
        if let Some(sentinel) = self.done_sentinel {
            base.done_sentinel = Some(sentinel);
        }
        base
    }
}
