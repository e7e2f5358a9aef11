//! Raw-mode line editor for the interactive chat
//!
//! Enter submits, Shift+Enter inserts a newline, Esc or Ctrl-C quits.

use std::io::{self, Write};

use aistream_core::ui::InputField;
use aistream_core::utils::{clear_input, handle_key_press, input_value, Key, KeyPress};
use anyhow::Result;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Text being edited
#[derive(Default)]
pub struct PromptInput {
    buffer: Mutex<String>,
}

impl InputField for PromptInput {
    fn value(&self) -> String {
        self.buffer.lock().clone()
    }

    fn set_value(&self, value: &str) {
        *self.buffer.lock() = value.to_string();
    }
}

/// What a key did to the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Nothing visible changed
    None,
    Insert(char),
    Delete,
    /// Enter pressed; carries the trimmed line
    Submit(String),
    Quit,
}

fn to_key_press(event: &KeyEvent) -> KeyPress {
    let key = match event.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyPress::new(key, event.modifiers.contains(KeyModifiers::SHIFT))
}

#[derive(Default)]
pub struct LineEditor {
    input: PromptInput,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &KeyEvent) -> Edit {
        if event.kind != KeyEventKind::Press {
            return Edit::None;
        }
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Edit::Quit;
        }

        let mut press = to_key_press(event);
        let mut submitted = None;
        handle_key_press(&mut press, || {
            submitted = Some(input_value(&self.input));
            clear_input(&self.input);
        });
        if let Some(line) = submitted {
            return Edit::Submit(line);
        }
        if press.is_default_prevented() {
            return Edit::None;
        }

        let mut buffer = self.input.buffer.lock();
        match press.key {
            Key::Enter => {
                buffer.push('\n');
                Edit::Insert('\n')
            }
            Key::Char(c) => {
                buffer.push(c);
                Edit::Insert(c)
            }
            Key::Backspace => match buffer.pop() {
                Some(_) => Edit::Delete,
                None => Edit::None,
            },
            Key::Escape => Edit::Quit,
            Key::Other => Edit::None,
        }
    }
}

/// Restores cooked mode (and keyboard flags) when dropped
struct RawModeGuard {
    enhanced: bool,
}

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        // Shift+Enter is only distinguishable with the kitty protocol
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        Ok(Self { enhanced })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Read one message; `None` when the user quits
pub async fn read_line(label: &str) -> Result<Option<String>> {
    let _guard = RawModeGuard::enable()?;
    let mut stdout = io::stdout();
    let mut editor = LineEditor::new();
    let mut events = EventStream::new();

    write!(stdout, "\r\n{} ", format!("[{}]", label).cyan())?;
    stdout.flush()?;

    while let Some(event) = events.next().await {
        let Event::Key(key) = event? else {
            continue;
        };
        match editor.apply(&key) {
            Edit::None => continue,
            Edit::Insert('\n') => write!(stdout, "\r\n  ")?,
            Edit::Insert(c) => write!(stdout, "{}", c)?,
            Edit::Delete => write!(stdout, "\x08 \x08")?,
            Edit::Submit(line) => {
                write!(stdout, "\r\n")?;
                stdout.flush()?;
                debug!("Prompt submitted {} chars", line.len());
                return Ok(Some(line));
            }
            Edit::Quit => {
                write!(stdout, "\r\n")?;
                stdout.flush()?;
                return Ok(None);
            }
        }
        stdout.flush()?;
    }
    Ok(None)
}
