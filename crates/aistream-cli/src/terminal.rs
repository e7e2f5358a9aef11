//! Terminal implementations of the session's UI sinks
//!
//! Streamed content goes to stdout so it can be piped; status, typing, and
//! badge chrome goes to stderr.

use std::io::{self, Write};
use std::sync::Arc;

use aistream_core::ui::{
    Badge, ContentSink, MessageList, MessageRole, StatusSink, SubmitControl, Visibility,
};
use crossterm::style::{Color, Stylize};
use parking_lot::Mutex;
use tracing::debug;

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stdout() -> Output {
    Arc::new(Mutex::new(Box::new(io::stdout())))
}

/// Drop control characters (escape sequences included) except newline and tab
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Visible text of terminal markup: escape sequences removed
///
/// Handles CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL` or `ESC \\`), and
/// two-byte escapes.
pub fn visible_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut chars = markup.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('[') => {
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    strip_controls(&out)
}

fn write_flush(out: &Output, text: &str) {
    let mut out = out.lock();
    let result = out.write_all(text.as_bytes());
    if let Err(e) = result.and_then(|()| out.flush()) {
        debug!("Terminal write failed: {}", e);
    }
}

/// Streams appended content to the terminal and remembers the visible text
pub struct TerminalContent {
    out: Output,
    rendered: Mutex<String>,
}

impl TerminalContent {
    pub fn new(out: Output) -> Self {
        Self {
            out,
            rendered: Mutex::new(String::new()),
        }
    }
}

impl ContentSink for TerminalContent {
    fn append_text(&self, text: &str) {
        let clean = strip_controls(text);
        write_flush(&self.out, &clean);
        self.rendered.lock().push_str(&clean);
    }

    fn append_markup(&self, markup: &str) {
        write_flush(&self.out, markup);
        self.rendered.lock().push_str(&visible_text(markup));
    }

    fn text(&self) -> String {
        self.rendered.lock().clone()
    }

    fn clear(&self) {
        self.rendered.lock().clear();
    }
}

/// Status line on stderr; blank updates are not printed
#[derive(Default)]
pub struct TerminalStatus {
    current: Mutex<String>,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for TerminalStatus {
    fn set_text(&self, text: &str) {
        let mut current = self.current.lock();
        if *current == text {
            return;
        }
        *current = text.to_string();
        if !text.is_empty() {
            eprintln!("{}", format!("[{}]", text).dark_grey());
        }
    }
}

/// Typing indicator, printed once each time it turns on
#[derive(Default)]
pub struct TerminalTyping {
    visible: Mutex<bool>,
}

impl TerminalTyping {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visibility for TerminalTyping {
    fn set_visible(&self, visible: bool) {
        let mut current = self.visible.lock();
        if visible && !*current {
            eprintln!("{}", "…".dark_grey());
        }
        *current = visible;
    }
}

/// Prompt label for the interactive chat
pub struct PromptButton {
    label: Mutex<String>,
}

impl PromptButton {
    pub fn new(label: &str) -> Self {
        Self {
            label: Mutex::new(label.to_string()),
        }
    }

    pub fn label(&self) -> String {
        self.label.lock().clone()
    }
}

impl SubmitControl for PromptButton {
    fn set_enabled(&self, enabled: bool) {
        // The prompt is not shown while a reply streams
        debug!("Submit enabled: {}", enabled);
    }

    fn set_label(&self, label: &str) {
        *self.label.lock() = label.to_string();
    }
}

/// Conversation printed as prefixed blocks
pub struct TerminalMessages {
    out: Output,
}

impl TerminalMessages {
    pub fn new(out: Output) -> Self {
        Self { out }
    }
}

fn role_prefix(role: MessageRole) -> String {
    match role {
        MessageRole::User => format!("{} ", "you>".cyan().bold()),
        MessageRole::Ai => format!("{} ", "ai>".magenta().bold()),
    }
}

impl MessageList for TerminalMessages {
    fn append_message(&self, id: Option<&str>, role: MessageRole) -> Arc<dyn ContentSink> {
        if let Some(id) = id {
            debug!("New {} message: {}", role, id);
        }
        write_flush(&self.out, &format!("\n{}", role_prefix(role)));
        Arc::new(TerminalContent::new(Arc::clone(&self.out)))
    }
}

/// First `#rrggbb` color in a CSS background value
pub fn first_hex_color(css: &str) -> Option<Color> {
    let start = css.find('#')?;
    let hex = css.get(start + 1..start + 7)?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Provider badge; printed when its background is set
#[derive(Default)]
pub struct TerminalBadge {
    label: Mutex<String>,
}

impl TerminalBadge {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Badge for TerminalBadge {
    fn set_label(&self, label: &str) {
        *self.label.lock() = label.to_string();
    }

    fn set_background(&self, background: &str) {
        let label = format!(" {} ", self.label.lock());
        match first_hex_color(background) {
            Some(color) => eprintln!("{}", label.with(Color::White).on(color).bold()),
            None => eprintln!("{}", label.bold()),
        }
    }
}
