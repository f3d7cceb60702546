//! Overlay that records a commit against one of the repository's active
//! features.

use std::path::PathBuf;

use crate::cursor::ViewportCursor;
use crate::input::LineInput;
use crate::keys::Key;
use crate::list::FlatItem;
use crate::list::FlatListBuilder;
use crate::overlay::OverlayOutcome;
use crate::overlay::OverlayResult;
use crate::source::ConductorData;
use crate::source::Feature;
use crate::source::FeatureStatus;
use crate::text::truncate;
use crate::text::StyledLine;
use crate::theme::Theme;

const MIN_VISIBLE: usize = 5;
const MAX_VISIBLE: usize = 15;
/// Title, search line, help and padding around the list.
const CHROME_ROWS: usize = 16;
const DESCRIPTION_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRow {
    Feature { index: usize, id: String },
    Skip,
}

impl FlatItem for LinkRow {
    type Key = Option<String>;

    fn key(&self) -> Option<String> {
        match self {
            Self::Feature { id, .. } => Some(id.clone()),
            Self::Skip => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkerMode {
    Browse,
    Search,
}

#[derive(Debug, Clone)]
pub struct FeatureLinker {
    repo: PathBuf,
    hash: String,
    message: String,
    /// Active features, in-progress first. Never filtered in place.
    features: Vec<Feature>,
    mode: LinkerMode,
    query: LineInput,
    view: ViewportCursor<LinkRow>,
    visible: usize,
}

impl FeatureLinker {
    /// `None` when the data has no feature a commit could be linked to.
    pub fn open(repo: PathBuf, hash: String, message: String, data: &ConductorData) -> Option<Self> {
        let mut features: Vec<Feature> = data
            .features
            .iter()
            .filter(|feature| feature.status.is_active())
            .cloned()
            .collect();
        if features.is_empty() {
            return None;
        }
        features.sort_by_key(|feature| feature.status != FeatureStatus::InProgress);

        let mut linker = Self {
            repo,
            hash,
            message,
            features,
            mode: LinkerMode::Browse,
            query: LineInput::default(),
            view: ViewportCursor::default(),
            visible: MIN_VISIBLE,
        };
        linker.rebuild();
        Some(linker)
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn mode(&self) -> LinkerMode {
        self.mode
    }

    pub fn view(&self) -> &ViewportCursor<LinkRow> {
        &self.view
    }

    pub fn captures_text(&self) -> bool {
        self.mode == LinkerMode::Search
    }

    pub fn selected_feature(&self) -> Option<&Feature> {
        match self.view.selected()? {
            LinkRow::Feature { index, .. } => self.features.get(*index),
            LinkRow::Skip => None,
        }
    }

    pub fn set_size(&mut self, height: usize) {
        self.visible = height
            .saturating_sub(CHROME_ROWS)
            .clamp(MIN_VISIBLE, MAX_VISIBLE);
        self.view.ensure_visible(self.visible);
    }

    fn matches(&self, feature: &Feature) -> bool {
        let query = self.query.value().to_lowercase();
        query.is_empty()
            || feature.description.to_lowercase().contains(&query)
            || feature.category.to_lowercase().contains(&query)
            || feature.id.to_lowercase().contains(&query)
    }

    fn rebuild(&mut self) {
        let mut builder = FlatListBuilder::new();
        for (index, feature) in self.features.iter().enumerate() {
            if self.matches(feature) {
                builder.push(LinkRow::Feature {
                    index,
                    id: feature.id.clone(),
                });
            }
        }
        builder.push(LinkRow::Skip);
        self.view.rebuild_against(builder.finish());
        self.view.ensure_visible(self.visible);
    }

    pub fn handle_key(&mut self, key: Key) -> OverlayOutcome {
        match (self.mode, key) {
            (_, Key::Down) | (LinkerMode::Browse, Key::Char('j')) => self.view.move_by(1),
            (_, Key::Up) | (LinkerMode::Browse, Key::Char('k')) => self.view.move_by(-1),
            (_, Key::Enter) => return self.confirm(),
            (LinkerMode::Browse, Key::Esc | Key::Char('s')) => {
                return OverlayOutcome::Closed(OverlayResult::Dismissed)
            }
            (LinkerMode::Browse, Key::Char('/')) => {
                self.mode = LinkerMode::Search;
                self.view.reset();
            }
            (LinkerMode::Search, Key::Esc) => {
                self.mode = LinkerMode::Browse;
                self.query.clear();
                self.rebuild();
                self.view.reset();
            }
            (LinkerMode::Search, other) => {
                if self.query.handle_key(other) {
                    self.rebuild();
                }
            }
            _ => {}
        }
        OverlayOutcome::Consumed
    }

    fn confirm(&self) -> OverlayOutcome {
        match self.selected_feature() {
            Some(feature) => OverlayOutcome::Closed(OverlayResult::LinkFeature {
                repo: self.repo.clone(),
                feature_id: feature.id.clone(),
                hash: self.hash.clone(),
                message: self.message.clone(),
            }),
            None => OverlayOutcome::Closed(OverlayResult::Dismissed),
        }
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        let short: String = self.hash.chars().take(7).collect();
        let mut lines = vec![
            StyledLine::styled("Link commit to feature?", theme.header()),
            StyledLine::styled(format!("{short} "), theme.dim())
                .with(truncate(&self.message, 60), theme.text()),
        ];
        if self.mode == LinkerMode::Search {
            lines.push(self.query.render(theme, "/ ", "search features…", true));
        } else {
            lines.push(StyledLine::new());
        }

        if self.view.scroll() > 0 {
            lines.push(StyledLine::styled(
                format!("  ↑ {} more", self.view.scroll()),
                theme.dim(),
            ));
        }
        for (index, row) in self.view.visible() {
            let selected = index == self.view.cursor();
            let arrow = if selected { "→ " } else { "  " };
            let mut line = match row {
                LinkRow::Feature { index, .. } => {
                    let Some(feature) = self.features.get(*index) else {
                        continue;
                    };
                    let (icon, style) = match feature.status {
                        FeatureStatus::InProgress => ("●", theme.accent()),
                        FeatureStatus::Failed => ("✗", theme.error()),
                        _ => ("○", theme.dim()),
                    };
                    StyledLine::plain(arrow)
                        .with(icon, style)
                        .with(" ", theme.text())
                        .with(truncate(&feature.description, DESCRIPTION_WIDTH), theme.text())
                        .with(format!(" [{}]", feature.category), theme.dim())
                        .with(format!(" {}", feature.id), theme.muted())
                }
                LinkRow::Skip => StyledLine::plain(arrow).with("[skip]", theme.dim()),
            };
            if selected {
                line = line.highlight(theme.cursor_bg);
            }
            lines.push(line);
        }
        let below = self
            .view
            .items()
            .len()
            .saturating_sub(self.view.scroll() + self.view.height());
        if below > 0 {
            lines.push(StyledLine::styled(format!("  ↓ {below} more"), theme.dim()));
        }

        lines.push(StyledLine::new());
        lines.push(StyledLine::styled(
            "j/k: navigate  /: search  enter: link  s/esc: skip",
            theme.dim(),
        ));
        lines
    }
}
