//! Terminal-independent styled text.
//!
//! Panels render into `StyledLine`s; the binary maps them onto its widget
//! library. Widths are measured in terminal columns.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
}

impl Style {
    pub fn fg(color: Rgb) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    pub fn on(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
    /// Whole-row background, used for the cursor row.
    pub fill: Option<Rgb>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let mut line = Self::new();
        line.push(text, style);
        line
    }

    pub fn push(&mut self, text: impl Into<String>, style: Style) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(StyledSpan { text, style });
        }
        self
    }

    pub fn with(mut self, text: impl Into<String>, style: Style) -> Self {
        self.push(text, style);
        self
    }

    pub fn highlight(mut self, bg: Rgb) -> Self {
        self.fill = Some(bg);
        self
    }

    /// Terminal columns the line occupies.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| display_width(&span.text)).sum()
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Pads with spaces so `right` ends at column `width`; falls back to a
    /// single space when there is no room.
    pub fn push_right_aligned(&mut self, right: StyledLine, width: usize) {
        let used = self.width() + right.width();
        let gap = width.saturating_sub(used + 1).max(1);
        self.push(" ".repeat(gap), Style::default());
        self.spans.extend(right.spans);
    }

    /// Cuts the line to at most `max` columns, ending with `…` when shortened.
    pub fn truncate(mut self, max: usize) -> Self {
        if self.width() <= max {
            return self;
        }
        let mut budget = max.saturating_sub(1);
        let mut kept = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if budget == 0 {
                break;
            }
            let len = display_width(&span.text);
            if len <= budget {
                budget -= len;
                kept.push(span);
            } else {
                let (text, _) = take_columns(&span.text, budget);
                kept.push(StyledSpan {
                    text,
                    style: span.style,
                });
                budget = 0;
            }
        }
        let ellipsis_style = kept.last().map(|span| span.style).unwrap_or_default();
        if max > 0 {
            kept.push(StyledSpan {
                text: "…".to_string(),
                style: ellipsis_style,
            });
        }
        self.spans = kept;
        self
    }
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `columns`, and its width. A wide
/// char that would straddle the limit is left out.
fn take_columns(text: &str, columns: usize) -> (String, usize) {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > columns {
            break;
        }
        used += w;
        out.push(c);
    }
    (out, used)
}

pub fn truncate(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let (mut out, _) = take_columns(text, max - 1);
    out.push('…');
    out
}

/// Greedy word wrap to `width` columns. Words wider than `width` are
/// hard-split.
pub fn word_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word = word;
            while display_width(word) > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let (head, _) = take_columns(word, width);
                // A single char wider than the line still has to go somewhere.
                let split = if head.is_empty() {
                    word.chars().next().map_or(word.len(), char::len_utf8)
                } else {
                    head.len()
                };
                lines.push(word[..split].to_string());
                word = &word[split..];
            }
            let word_len = display_width(word);
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > width && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word_len;
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
