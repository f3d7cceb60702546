use tracing::warn;

use crate::config::ThemeConfig;
use crate::text::Rgb;
use crate::text::Style;

pub const LANE_COUNT: usize = 6;

/// Resolved colours. Built once at startup and shared read-only by every
/// panel through an `Arc<Theme>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub bg: Rgb,
    pub fg: Rgb,
    pub accent: Rgb,
    pub accent2: Rgb,
    pub muted: Rgb,
    pub dim: Rgb,
    pub staged: Rgb,
    pub unstaged: Rgb,
    pub diff_add: Rgb,
    pub diff_remove: Rgb,
    pub diff_hunk: Rgb,
    pub branch: Rgb,
    pub error: Rgb,
    pub cursor_bg: Rgb,
    pub border: Rgb,
    pub status_bar_bg: Rgb,
    pub status_bar_fg: Rgb,
    pub lanes: [Rgb; LANE_COUNT],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Rgb(0x10, 0x10, 0x10),
            fg: Rgb(0xff, 0xff, 0xff),
            accent: Rgb(0xff, 0xc7, 0x99),
            accent2: Rgb(0x99, 0xff, 0xe4),
            muted: Rgb(0x50, 0x50, 0x50),
            dim: Rgb(0xa0, 0xa0, 0xa0),
            staged: Rgb(0x99, 0xff, 0xe4),
            unstaged: Rgb(0xff, 0x80, 0x80),
            diff_add: Rgb(0x99, 0xff, 0xe4),
            diff_remove: Rgb(0xff, 0x80, 0x80),
            diff_hunk: Rgb(0xff, 0xc7, 0x99),
            branch: Rgb(0xff, 0xc7, 0x99),
            error: Rgb(0xff, 0x80, 0x80),
            cursor_bg: Rgb(0x2a, 0x2a, 0x2a),
            border: Rgb(0x28, 0x28, 0x28),
            status_bar_bg: Rgb(0x1a, 0x1a, 0x1a),
            status_bar_fg: Rgb(0xa0, 0xa0, 0xa0),
            lanes: [
                Rgb(0x66, 0x99, 0xff),
                Rgb(0xff, 0xc7, 0x99),
                Rgb(0xff, 0x99, 0xcc),
                Rgb(0x99, 0xff, 0xe4),
                Rgb(0xcc, 0x99, 0xff),
                Rgb(0xff, 0xff, 0x99),
            ],
        }
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |name: &str, value: &Option<String>, fallback: Rgb| match value.as_deref() {
            None => fallback,
            Some(hex) => Rgb::from_hex(hex).unwrap_or_else(|| {
                warn!(key = name, value = hex, "ignoring invalid theme colour");
                fallback
            }),
        };

        let mut lanes = base.lanes;
        for (slot, hex) in lanes.iter_mut().zip(config.graph_colors.iter()) {
            *slot = pick("graph_colors", &Some(hex.clone()), *slot);
        }

        Self {
            bg: pick("bg", &config.bg, base.bg),
            fg: pick("fg", &config.fg, base.fg),
            accent: pick("accent", &config.accent, base.accent),
            accent2: pick("accent2", &config.accent2, base.accent2),
            muted: pick("muted", &config.muted, base.muted),
            dim: pick("dim", &config.dim, base.dim),
            staged: pick("staged", &config.staged, base.staged),
            unstaged: pick("unstaged", &config.unstaged, base.unstaged),
            diff_add: pick("diff_add", &config.diff_add, base.diff_add),
            diff_remove: pick("diff_remove", &config.diff_remove, base.diff_remove),
            diff_hunk: pick("diff_hunk", &config.diff_hunk, base.diff_hunk),
            branch: pick("branch", &config.branch, base.branch),
            error: pick("error", &config.error, base.error),
            cursor_bg: pick("cursor_bg", &config.cursor_bg, base.cursor_bg),
            border: pick("border", &config.border, base.border),
            status_bar_bg: pick("status_bar_bg", &config.status_bar_bg, base.status_bar_bg),
            status_bar_fg: pick("status_bar_fg", &config.status_bar_fg, base.status_bar_fg),
            lanes,
        }
    }

    pub fn text(&self) -> Style {
        Style::fg(self.fg)
    }

    pub fn header(&self) -> Style {
        Style::fg(self.fg).bold()
    }

    pub fn accent(&self) -> Style {
        Style::fg(self.accent)
    }

    pub fn accent2(&self) -> Style {
        Style::fg(self.accent2)
    }

    pub fn muted(&self) -> Style {
        Style::fg(self.muted)
    }

    pub fn dim(&self) -> Style {
        Style::fg(self.dim)
    }

    pub fn staged(&self) -> Style {
        Style::fg(self.staged)
    }

    pub fn unstaged(&self) -> Style {
        Style::fg(self.unstaged)
    }

    pub fn branch(&self) -> Style {
        Style::fg(self.branch)
    }

    pub fn error(&self) -> Style {
        Style::fg(self.error)
    }

    pub fn lane(&self, column: usize) -> Style {
        Style::fg(self.lanes[column % LANE_COUNT])
    }

    pub fn status_bar(&self) -> Style {
        Style::fg(self.status_bar_fg).on(self.status_bar_bg)
    }

    /// Colour for one line of unified diff output.
    pub fn diff_line(&self, line: &str) -> Style {
        const META: [&str; 4] = ["+++ ", "--- ", "diff ", "index "];
        if META.iter().any(|prefix| line.starts_with(prefix)) {
            Style::fg(self.dim).bold()
        } else if line.starts_with("@@") {
            Style::fg(self.diff_hunk)
        } else if line.starts_with('+') {
            Style::fg(self.diff_add)
        } else if line.starts_with('-') {
            Style::fg(self.diff_remove)
        } else {
            self.text()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn overrides_replace_only_valid_colours() {
        let config = ThemeConfig {
            accent: Some("#010203".to_string()),
            fg: Some("not-a-colour".to_string()),
            graph_colors: vec!["#000001".to_string()],
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);
        let base = Theme::default();
        assert_eq!(theme.accent, Rgb(1, 2, 3));
        assert_eq!(theme.fg, base.fg);
        assert_eq!(theme.lanes[0], Rgb(0, 0, 1));
        assert_eq!(theme.lanes[1], base.lanes[1]);
    }

    #[test]
    fn diff_lines_are_coloured_by_prefix() {
        let theme = Theme::default();
        assert_eq!(theme.diff_line("+++ b/a.rs"), Style::fg(theme.dim).bold());
        assert_eq!(theme.diff_line("@@ -1 +1 @@"), Style::fg(theme.diff_hunk));
        assert_eq!(theme.diff_line("+added"), Style::fg(theme.diff_add));
        assert_eq!(theme.diff_line("-gone"), Style::fg(theme.diff_remove));
        assert_eq!(theme.diff_line(" context"), theme.text());
    }

    #[test]
    fn lanes_wrap_around() {
        let theme = Theme::default();
        assert_eq!(theme.lane(LANE_COUNT), theme.lane(0));
    }
}
