//! Single-line text entry shared by the pickers and the commit editor.

use crate::keys::Key;
use crate::text::Style;
use crate::text::StyledLine;
use crate::theme::Theme;

pub const INPUT_LIMIT: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    value: String,
}

impl LineInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Applies an editing key. Returns false for keys that are not edits.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(c) if !c.is_control() => {
                if self.value.chars().count() < INPUT_LIMIT {
                    self.value.push(c);
                }
            }
            Key::Backspace => {
                self.value.pop();
            }
            Key::Ctrl('u') => self.value.clear(),
            Key::Ctrl('w') => {
                let trimmed = self.value.trim_end().len();
                self.value.truncate(trimmed);
                let cut = self.value.rfind(' ').map(|idx| idx + 1).unwrap_or(0);
                self.value.truncate(cut);
            }
            _ => return false,
        }
        true
    }

    /// `label` then the value, or the placeholder when empty, with a block
    /// cursor when `active`.
    pub fn render(&self, theme: &Theme, label: &str, placeholder: &str, active: bool) -> StyledLine {
        let mut line = StyledLine::new();
        if !label.is_empty() {
            line.push(label, theme.dim());
        }
        if self.value.is_empty() && !active {
            line.push(placeholder, theme.muted());
        } else {
            line.push(self.value.clone(), theme.text());
        }
        if active {
            line.push("█", Style::fg(theme.accent));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn editing_keys_change_the_value() {
        let mut input = LineInput::default();
        for c in "fix the bug".chars() {
            assert!(input.handle_key(Key::Char(c)));
        }
        input.handle_key(Key::Backspace);
        assert_eq!(input.value(), "fix the bu");
        input.handle_key(Key::Ctrl('w'));
        assert_eq!(input.value(), "fix the ");
        input.handle_key(Key::Ctrl('u'));
        assert!(input.is_empty());
        assert!(!input.handle_key(Key::Enter));
    }

    #[test]
    fn placeholder_only_when_idle_and_empty() {
        let theme = Theme::default();
        let input = LineInput::default();
        assert_eq!(input.render(&theme, "> ", "filter…", false).text(), "> filter…");
        assert_eq!(input.render(&theme, "> ", "filter…", true).text(), "> █");
    }
}
