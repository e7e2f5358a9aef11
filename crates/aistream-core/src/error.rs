//! Error types

use thiserror::Error;

/// Why a stream ended abnormally
///
/// Transport failures and timeouts share one end-of-stream path; the
/// distinction is only surfaced through [`StreamError::kind`] so hooks can
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Connection-level failure (DNS, refused, reset, body read error)
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),

    /// Body ended without a terminal event
    #[error("stream closed before a terminal event")]
    Closed,

    /// No terminal event within the configured duration
    #[error("stream timed out after {0} ms")]
    Timeout(u64),
}

impl StreamError {
    /// Short tag for the error, `"timeout"` or `"error"`
    pub fn kind(&self) -> &'static str {
        match self {
            StreamError::Timeout(_) => "timeout",
            _ => "error",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StreamError::Timeout(_))
    }
}

/// Invalid session configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("message parameter name must not be empty")]
    EmptyMessageParam,

    #[error("done sentinel must not be empty when set")]
    EmptyDoneSentinel,

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failure of a plain (non-streaming) backend request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
