//! Request parameter shapes and URL building

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// What a widget asks the backend to stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamParams {
    /// Chat message, sent under the configured message parameter
    Message { message: String },
    /// Translation request
    Translate {
        text: String,
        #[serde(rename = "targetLang")]
        target_lang: String,
    },
    /// Weather query
    Weather { city: String },
}

impl StreamParams {
    pub fn message(message: impl Into<String>) -> Self {
        StreamParams::Message {
            message: message.into(),
        }
    }

    pub fn translate(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        StreamParams::Translate {
            text: text.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn weather(city: impl Into<String>) -> Self {
        StreamParams::Weather { city: city.into() }
    }

    /// Query pairs for this shape; empty values contribute nothing
    fn query_pairs<'a>(&'a self, message_param: &'a str) -> Vec<(&'a str, &'a str)> {
        match self {
            StreamParams::Message { message } if !message.is_empty() => {
                vec![(message_param, message.as_str())]
            }
            StreamParams::Translate { text, target_lang }
                if !text.is_empty() && !target_lang.is_empty() =>
            {
                vec![("text", text.as_str()), ("targetLang", target_lang.as_str())]
            }
            StreamParams::Weather { city } if !city.is_empty() => vec![("city", city.as_str())],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for StreamParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamParams::Message { message } => write!(f, "message({} chars)", message.len()),
            StreamParams::Translate { text, target_lang } => {
                write!(f, "translate({} chars -> {})", text.len(), target_lang)
            }
            StreamParams::Weather { city } => write!(f, "weather({})", city),
        }
    }
}

/// Serialize `params` as a form-encoded query against `endpoint`
///
/// Returns the bare endpoint when the shape has no usable values.
pub fn build_request_url(endpoint: &str, params: &StreamParams, message_param: &str) -> String {
    let pairs = params.query_pairs(message_param);
    if pairs.is_empty() {
        return endpoint.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}?{}", endpoint, query)
}
