//! Scroll-only viewport over pre-rendered lines.
//!
//! Used wherever a panel shows read-only text that can outgrow its region:
//! the conductor detail pane, the commit detail block, the diff view and the
//! help overlay.

use crate::text::StyledLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewport {
    lines: Vec<StyledLine>,
    scroll: usize,
    height: usize,
}

impl Default for DetailViewport {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            scroll: 0,
            height: 1,
        }
    }
}

impl DetailViewport {
    pub fn new(lines: Vec<StyledLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[StyledLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Replaces the content, keeping the scroll offset where it still fits.
    pub fn set_lines(&mut self, lines: Vec<StyledLine>) {
        self.lines = lines;
        self.clamp();
    }

    /// Replaces the content and returns to the top.
    pub fn replace(&mut self, lines: Vec<StyledLine>) {
        self.lines = lines;
        self.scroll = 0;
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.clamp();
    }

    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta.unsigned_abs())
        };
        self.clamp();
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.height as isize);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.height as isize));
    }

    pub fn to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll >= self.max_scroll()
    }

    /// The window, padded with blank lines to exactly `height` rows.
    pub fn visible(&self) -> Vec<StyledLine> {
        let mut out: Vec<StyledLine> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(self.height)
            .cloned()
            .collect();
        out.resize(self.height, StyledLine::new());
        out
    }

    fn clamp(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }
}
