//! In-memory sinks
//!
//! Record what the session does to them. Handy for headless hosts and tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    Badge, ContentSink, InputField, MessageList, MessageRole, ScrollContainer, StatusSink,
    SubmitControl, Visibility,
};

#[derive(Debug, Default)]
pub struct MemoryControl {
    state: Mutex<(bool, String)>,
}

impl MemoryControl {
    pub fn new(label: &str) -> Self {
        Self {
            state: Mutex::new((true, label.to_string())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().0
    }

    pub fn label(&self) -> String {
        self.state.lock().1.clone()
    }
}

impl SubmitControl for MemoryControl {
    fn set_enabled(&self, enabled: bool) {
        self.state.lock().0 = enabled;
    }

    fn set_label(&self, label: &str) {
        self.state.lock().1 = label.to_string();
    }
}

/// Recent status values kept by [`MemoryStatus`]
pub const STATUS_HISTORY_LEN: usize = 32;

/// Status sink that keeps the current value and the last few it was set to
#[derive(Debug, Default)]
pub struct MemoryStatus {
    history: Mutex<VecDeque<String>>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.history.lock().back().cloned().unwrap_or_default()
    }

    /// Oldest first, at most [`STATUS_HISTORY_LEN`] entries
    pub fn history(&self) -> Vec<String> {
        self.history.lock().iter().cloned().collect()
    }
}

impl StatusSink for MemoryStatus {
    fn set_text(&self, text: &str) {
        let mut history = self.history.lock();
        if history.len() == STATUS_HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(text.to_string());
    }
}

#[derive(Debug, Default)]
pub struct MemoryFlag {
    visible: Mutex<bool>,
}

impl MemoryFlag {
    pub fn new(visible: bool) -> Self {
        Self {
            visible: Mutex::new(visible),
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.lock()
    }
}

impl Visibility for MemoryFlag {
    fn set_visible(&self, visible: bool) {
        *self.visible.lock() = visible;
    }
}

/// A single append operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appended {
    Text(String),
    Markup(String),
}

/// Content sink that renders to a plain string
///
/// Markup is stored as given; `text()` returns it unrendered, which is
/// enough for the spacing heuristic on tag-free streams.
#[derive(Debug, Default)]
pub struct MemoryContent {
    ops: Mutex<Vec<Appended>>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<Appended> {
        self.ops.lock().clone()
    }
}

impl ContentSink for MemoryContent {
    fn append_text(&self, text: &str) {
        self.ops.lock().push(Appended::Text(text.to_string()));
    }

    fn append_markup(&self, markup: &str) {
        self.ops.lock().push(Appended::Markup(markup.to_string()));
    }

    fn text(&self) -> String {
        self.ops
            .lock()
            .iter()
            .map(|op| match op {
                Appended::Text(s) | Appended::Markup(s) => s.as_str(),
            })
            .collect()
    }

    fn clear(&self) {
        self.ops.lock().clear();
    }
}

/// Scroll container with a settable content height
#[derive(Debug, Default)]
pub struct MemoryScroll {
    state: Mutex<(usize, usize)>,
}

impl MemoryScroll {
    pub fn new(height: usize) -> Self {
        Self {
            state: Mutex::new((height, 0)),
        }
    }

    pub fn set_height(&self, height: usize) {
        self.state.lock().0 = height;
    }

    pub fn scroll_top(&self) -> usize {
        self.state.lock().1
    }
}

impl ScrollContainer for MemoryScroll {
    fn scroll_height(&self) -> usize {
        self.state.lock().0
    }

    fn set_scroll_top(&self, top: usize) {
        self.state.lock().1 = top;
    }
}

/// One bubble in a [`MemoryMessageList`]
#[derive(Debug, Clone)]
pub struct MemoryMessage {
    pub id: Option<String>,
    pub role: MessageRole,
    pub content: Arc<MemoryContent>,
}

#[derive(Debug, Default)]
pub struct MemoryMessageList {
    messages: Mutex<Vec<MemoryMessage>>,
}

impl MemoryMessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<MemoryMessage> {
        self.messages.lock().clone()
    }

    pub fn find(&self, id: &str) -> Option<MemoryMessage> {
        self.messages
            .lock()
            .iter()
            .find(|m| m.id.as_deref() == Some(id))
            .cloned()
    }
}

impl MessageList for MemoryMessageList {
    fn append_message(&self, id: Option<&str>, role: MessageRole) -> Arc<dyn ContentSink> {
        let content = Arc::new(MemoryContent::new());
        self.messages.lock().push(MemoryMessage {
            id: id.map(str::to_string),
            role,
            content: Arc::clone(&content),
        });
        content
    }
}

#[derive(Debug, Default)]
pub struct MemoryInput {
    value: Mutex<String>,
}

impl MemoryInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: Mutex::new(value.to_string()),
        }
    }
}

impl InputField for MemoryInput {
    fn value(&self) -> String {
        self.value.lock().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.lock() = value.to_string();
    }
}

#[derive(Debug, Default)]
pub struct MemoryBadge {
    state: Mutex<(String, String)>,
}

impl MemoryBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> String {
        self.state.lock().0.clone()
    }

    pub fn background(&self) -> String {
        self.state.lock().1.clone()
    }
}

impl Badge for MemoryBadge {
    fn set_label(&self, label: &str) {
        self.state.lock().0 = label.to_string();
    }

    fn set_background(&self, background: &str) {
        self.state.lock().1 = background.to_string();
    }
}
