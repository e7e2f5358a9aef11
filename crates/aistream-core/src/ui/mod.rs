//! UI collaborator traits
//!
//! The session never touches a concrete widget toolkit. Hosts hand it these
//! sinks; the terminal front end and the in-memory [`memory`] sinks are two
//! implementations.
//!
//! All methods take `&self` so one sink can be shared between the session,
//! its hooks, and the host.

pub mod memory;

use std::fmt;
use std::sync::Arc;

/// Submit button (or equivalent) for the widget
pub trait SubmitControl: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn set_label(&self, label: &str);
}

/// One-line status text
pub trait StatusSink: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Anything that can be shown or hidden (typing indicator, result panel)
pub trait Visibility: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Region that receives streamed content
pub trait ContentSink: Send + Sync {
    /// Append plain text; the sink must not interpret it as markup
    fn append_text(&self, text: &str);
    /// Append trusted markup verbatim
    fn append_markup(&self, markup: &str);
    /// Rendered text content, used by the spacing heuristic
    fn text(&self) -> String;
    fn clear(&self);
}

/// Scrollable viewport around the content
pub trait ScrollContainer: Send + Sync {
    fn scroll_height(&self) -> usize;
    fn set_scroll_top(&self, top: usize);

    fn scroll_to_bottom(&self) {
        self.set_scroll_top(self.scroll_height());
    }
}

/// Who authored a message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Ai,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Ai => "ai",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation area that can grow new message bubbles
pub trait MessageList: Send + Sync {
    /// Append an empty bubble and return its content sink
    fn append_message(&self, id: Option<&str>, role: MessageRole) -> Arc<dyn ContentSink>;
}

/// Editable text input
pub trait InputField: Send + Sync {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

/// Provider badge
pub trait Badge: Send + Sync {
    fn set_label(&self, label: &str);
    fn set_background(&self, background: &str);
}
