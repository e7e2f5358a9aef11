//! Widget helpers shared by the front ends

use crate::ui::{ContentSink, InputField, Visibility};

/// Keys the helpers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Escape,
    Char(char),
    Other,
}

/// A key event that a handler may claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    default_prevented: bool,
}

impl KeyPress {
    pub fn new(key: Key, shift: bool) -> Self {
        Self {
            key,
            shift,
            default_prevented: false,
        }
    }

    /// Tell the host not to apply its own handling (e.g. inserting a newline)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Enter without Shift submits: claims the event and runs `submit`
///
/// Returns whether `submit` ran.
pub fn handle_key_press(event: &mut KeyPress, submit: impl FnOnce()) -> bool {
    if event.key == Key::Enter && !event.shift {
        event.prevent_default();
        submit();
        true
    } else {
        false
    }
}

/// Trimmed value of an input
pub fn input_value(input: &dyn InputField) -> String {
    input.value().trim().to_string()
}

pub fn clear_input(input: &dyn InputField) {
    input.set_value("");
}

/// Reveal a result panel and empty its content
pub fn show_result_container(container: &dyn Visibility, content: &dyn ContentSink) {
    container.set_visible(true);
    content.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::memory::{MemoryContent, MemoryFlag, MemoryInput};

    #[test]
    fn test_enter_submits() {
        let mut event = KeyPress::new(Key::Enter, false);
        let mut submitted = false;
        assert!(handle_key_press(&mut event, || submitted = true));
        assert!(submitted);
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_shift_enter_and_other_keys_pass_through() {
        for mut event in [
            KeyPress::new(Key::Enter, true),
            KeyPress::new(Key::Char('a'), false),
            KeyPress::new(Key::Escape, false),
        ] {
            let mut submitted = false;
            assert!(!handle_key_press(&mut event, || submitted = true));
            assert!(!submitted);
            assert!(!event.is_default_prevented());
        }
    }

    #[test]
    fn test_input_value_trims_and_clear_empties() {
        let input = MemoryInput::new("  Paris \n");
        assert_eq!(input_value(&input), "Paris");
        clear_input(&input);
        assert_eq!(input_value(&input), "");
    }

    #[test]
    fn test_show_result_container() {
        let panel = MemoryFlag::new(false);
        let content = MemoryContent::new();
        content.append_text("old result");

        show_result_container(&panel, &content);

        assert!(panel.is_visible());
        assert_eq!(content.text(), "");
    }
}
