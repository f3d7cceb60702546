//! Feature / session / quality / memory panel.
//!
//! A collapsible list on top and, when the panel is tall enough, a detail
//! viewport below it describing the row under the cursor.

use std::sync::Arc;

use crate::cursor::ViewportCursor;
use crate::detail::DetailViewport;
use crate::keys::Nav;
use crate::list::CollapseSet;
use crate::list::FlatItem;
use crate::list::FlatList;
use crate::list::FlatListBuilder;
use crate::source::ConductorData;
use crate::source::Feature;
use crate::source::FeatureStatus;
use crate::text::display_width;
use crate::text::truncate;
use crate::text::word_wrap;
use crate::text::Style;
use crate::text::StyledLine;
use crate::theme::Theme;

/// Panels taller than this get a detail viewport.
pub const DETAIL_THRESHOLD: usize = 15;
pub const DETAIL_PERCENT: usize = 35;
pub const DETAIL_MIN_HEIGHT: usize = 6;

/// Column where detail values start.
const VALUE_INDENT: usize = 10;

/// Splits the panel height into (list, detail). The divider takes the
/// remaining row when a detail is shown.
pub fn split_heights(height: usize) -> (usize, usize) {
    if height > DETAIL_THRESHOLD {
        let detail = (height * DETAIL_PERCENT / 100).max(DETAIL_MIN_HEIGHT);
        (height - detail - 1, detail)
    } else {
        (height.max(1), 0)
    }
}

/// Section headers double as collapse keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConductorGroup {
    Features,
    Session,
    Quality,
    Memories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffField {
    Task,
    Next,
    Block,
    File,
}

impl HandoffField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Task => "Task:",
            Self::Next => "Next:",
            Self::Block => "Block:",
            Self::File => "File:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityField {
    Shortcut,
    Skipped,
    Limit,
    Deferred,
    Debt,
}

impl QualityField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shortcut => "Shortcut:",
            Self::Skipped => "Skipped:",
            Self::Limit => "Limit:",
            Self::Deferred => "Deferred:",
            Self::Debt => "Debt:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductorKind {
    SectionSpacer,
    FeatureHeader,
    FeatureItem,
    SessionHeader,
    HandoffItem,
    QualityHeader,
    QualityItem,
    MemoryHeader,
    MemoryItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConductorItem {
    Spacer(ConductorGroup),
    Header(ConductorGroup),
    Feature {
        index: usize,
        id: String,
    },
    Handoff {
        field: HandoffField,
        text: String,
    },
    Quality {
        reflection: usize,
        field: QualityField,
        text: String,
    },
    Memory {
        index: usize,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConductorKey {
    Spacer(ConductorGroup),
    Header(ConductorGroup),
    Feature(String),
    Handoff(HandoffField, String),
    Quality(usize, QualityField, String),
    Memory(String),
}

impl ConductorItem {
    pub fn kind(&self) -> ConductorKind {
        match self {
            Self::Spacer(_) => ConductorKind::SectionSpacer,
            Self::Header(ConductorGroup::Features) => ConductorKind::FeatureHeader,
            Self::Header(ConductorGroup::Session) => ConductorKind::SessionHeader,
            Self::Header(ConductorGroup::Quality) => ConductorKind::QualityHeader,
            Self::Header(ConductorGroup::Memories) => ConductorKind::MemoryHeader,
            Self::Feature { .. } => ConductorKind::FeatureItem,
            Self::Handoff { .. } => ConductorKind::HandoffItem,
            Self::Quality { .. } => ConductorKind::QualityItem,
            Self::Memory { .. } => ConductorKind::MemoryItem,
        }
    }

    /// Line text for handoff and quality rows, e.g. `Next: write tests`.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Handoff { field, text } => Some(format!("{} {text}", field.label())),
            Self::Quality { field, text, .. } => Some(format!("{} {text}", field.label())),
            _ => None,
        }
    }
}

impl FlatItem for ConductorItem {
    type Key = ConductorKey;

    fn key(&self) -> ConductorKey {
        match self {
            Self::Spacer(group) => ConductorKey::Spacer(*group),
            Self::Header(group) => ConductorKey::Header(*group),
            Self::Feature { id, .. } => ConductorKey::Feature(id.clone()),
            Self::Handoff { field, text } => ConductorKey::Handoff(*field, text.clone()),
            Self::Quality {
                reflection,
                field,
                text,
            } => ConductorKey::Quality(*reflection, *field, text.clone()),
            Self::Memory { name, .. } => ConductorKey::Memory(name.clone()),
        }
    }

    fn selectable(&self) -> bool {
        self.kind() != ConductorKind::SectionSpacer
    }
}

/// Builds the conductor rows. Headers are jump targets; a collapsed header
/// keeps its row but drops its children. Data with nothing at all in it
/// yields an empty list.
pub fn flatten(data: &ConductorData, collapse: &CollapseSet<ConductorGroup>) -> FlatList<ConductorItem> {
    let mut out = FlatListBuilder::new();
    let has_anything = !data.features.is_empty()
        || data.session.is_some()
        || !data.quality.is_empty()
        || !data.memories.is_empty();
    if !has_anything {
        return out.finish();
    }

    out.push_group(ConductorItem::Header(ConductorGroup::Features));
    if !collapse.is_collapsed(&ConductorGroup::Features) {
        let pending = data
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.status != FeatureStatus::Passed);
        let passed = data
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.status == FeatureStatus::Passed);
        for (index, feature) in pending.chain(passed) {
            out.push(ConductorItem::Feature {
                index,
                id: feature.id.clone(),
            });
        }
    }

    if data.session.is_some() {
        out.push(ConductorItem::Spacer(ConductorGroup::Session));
        out.push_group(ConductorItem::Header(ConductorGroup::Session));
        if let (false, Some(handoff)) = (
            collapse.is_collapsed(&ConductorGroup::Session),
            data.handoff.as_ref(),
        ) {
            let mut push = |field: HandoffField, text: &str| {
                out.push(ConductorItem::Handoff {
                    field,
                    text: text.to_string(),
                });
            };
            if !handoff.current_task.is_empty() {
                push(HandoffField::Task, &handoff.current_task);
            }
            for step in &handoff.next_steps {
                push(HandoffField::Next, step);
            }
            for blocker in &handoff.blockers {
                push(HandoffField::Block, blocker);
            }
            for file in &handoff.files_modified {
                push(HandoffField::File, file);
            }
        }
    }

    if !data.quality.is_empty() {
        out.push(ConductorItem::Spacer(ConductorGroup::Quality));
        out.push_group(ConductorItem::Header(ConductorGroup::Quality));
        if !collapse.is_collapsed(&ConductorGroup::Quality) {
            for (reflection, q) in data.quality.iter().enumerate() {
                let fields = [
                    (QualityField::Shortcut, &q.shortcuts_taken),
                    (QualityField::Skipped, &q.tests_skipped),
                    (QualityField::Limit, &q.known_limitations),
                    (QualityField::Deferred, &q.deferred_work),
                    (QualityField::Debt, &q.technical_debt),
                ];
                for (field, entries) in fields {
                    for text in entries {
                        out.push(ConductorItem::Quality {
                            reflection,
                            field,
                            text: text.clone(),
                        });
                    }
                }
            }
        }
    }

    if !data.memories.is_empty() {
        out.push(ConductorItem::Spacer(ConductorGroup::Memories));
        out.push_group(ConductorItem::Header(ConductorGroup::Memories));
        if !collapse.is_collapsed(&ConductorGroup::Memories) {
            for (index, memory) in data.memories.iter().enumerate() {
                out.push(ConductorItem::Memory {
                    index,
                    name: memory.name.clone(),
                });
            }
        }
    }

    out.finish()
}

/// Which half of the panel owns the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConductorSection {
    #[default]
    List,
    Detail,
}

pub struct ConductorPanel {
    theme: Arc<Theme>,
    data: Option<ConductorData>,
    collapse: CollapseSet<ConductorGroup>,
    view: ViewportCursor<ConductorItem>,
    detail: DetailViewport,
    width: usize,
    height: usize,
}

impl ConductorPanel {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self {
            theme,
            data: None,
            collapse: CollapseSet::default(),
            view: ViewportCursor::default(),
            detail: DetailViewport::default(),
            width: 0,
            height: 1,
        }
    }

    pub fn data(&self) -> Option<&ConductorData> {
        self.data.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn view(&self) -> &ViewportCursor<ConductorItem> {
        &self.view
    }

    pub fn detail(&self) -> &DetailViewport {
        &self.detail
    }

    pub fn selected(&self) -> Option<&ConductorItem> {
        self.view.selected()
    }

    pub fn selected_feature(&self) -> Option<&Feature> {
        match self.selected()? {
            ConductorItem::Feature { index, .. } => self.data.as_ref()?.features.get(*index),
            _ => None,
        }
    }

    pub fn split(&self) -> (usize, usize) {
        split_heights(self.height)
    }

    pub fn has_detail(&self) -> bool {
        self.split().1 > 0
    }

    /// Replaces the snapshot. `None` means no conductor data for the
    /// repository under the dashboard cursor.
    pub fn set_data(&mut self, data: Option<ConductorData>) {
        self.collapse.default_collapsed(ConductorGroup::Memories);
        let previous = self.selected().map(FlatItem::key);
        self.data = data;
        let list = self.flatten();
        self.view.rebuild_against(list);
        self.view.ensure_visible(self.split().0);
        let same_row = previous == self.selected().map(FlatItem::key);
        self.refresh_detail(!same_row);
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height.max(1);
        let (list, detail) = self.split();
        self.view.ensure_visible(list);
        self.detail.set_height(detail);
        self.refresh_detail(false);
    }

    fn flatten(&self) -> FlatList<ConductorItem> {
        match &self.data {
            Some(data) => flatten(data, &self.collapse),
            None => FlatList::default(),
        }
    }

    fn rebuild(&mut self) {
        let list = self.flatten();
        self.view.rebuild_against(list);
        self.view.ensure_visible(self.split().0);
    }

    /// Toggles the header under the cursor. Returns false on other rows.
    pub fn toggle_selected(&mut self) -> bool {
        let Some(ConductorItem::Header(group)) = self.selected().cloned() else {
            return false;
        };
        self.collapse.toggle(group);
        self.rebuild();
        self.refresh_detail(false);
        true
    }

    pub fn is_collapsed(&self, group: ConductorGroup) -> bool {
        self.collapse.is_collapsed(&group)
    }

    /// Handles a key for the given section. Returns the section that owns
    /// input afterwards, or `None` when the key is for the router.
    pub fn handle_nav(&mut self, section: ConductorSection, nav: Nav) -> Option<ConductorSection> {
        match section {
            ConductorSection::List => self.handle_list_nav(nav),
            ConductorSection::Detail => self.handle_detail_nav(nav),
        }
    }

    fn handle_list_nav(&mut self, nav: Nav) -> Option<ConductorSection> {
        let list_height = self.split().0 as isize;
        match nav {
            Nav::Up => self.move_cursor(|view| view.move_by(-1)),
            Nav::Down => self.move_cursor(|view| view.move_by(1)),
            Nav::PageUp => self.move_cursor(|view| view.move_by(-list_height)),
            Nav::PageDown => self.move_cursor(|view| view.move_by(list_height)),
            Nav::Top => self.move_cursor(|view| view.move_by(-(view.items().len() as isize))),
            Nav::Bottom => self.move_cursor(|view| view.move_by(view.items().len() as isize)),
            Nav::NextGroup => self.move_cursor(ViewportCursor::jump_to_next_group),
            Nav::PrevGroup => self.move_cursor(ViewportCursor::jump_to_prev_group),
            Nav::Open => {
                if self.toggle_selected() {
                    return Some(ConductorSection::List);
                }
                if self.selected().is_some() && self.has_detail() {
                    return Some(ConductorSection::Detail);
                }
            }
            Nav::FocusDown => {
                if self.has_detail() {
                    return Some(ConductorSection::Detail);
                }
            }
            Nav::Back | Nav::FocusLeft | Nav::FocusRight | Nav::FocusUp => return None,
        }
        Some(ConductorSection::List)
    }

    fn handle_detail_nav(&mut self, nav: Nav) -> Option<ConductorSection> {
        match nav {
            Nav::Up => self.detail.scroll_by(-1),
            Nav::Down => self.detail.scroll_by(1),
            Nav::PageUp => self.detail.page_up(),
            Nav::PageDown => self.detail.page_down(),
            Nav::Top => self.detail.to_top(),
            Nav::Bottom => self.detail.to_bottom(),
            Nav::Back | Nav::FocusUp => return Some(ConductorSection::List),
            Nav::FocusLeft | Nav::FocusRight => return None,
            Nav::NextGroup | Nav::PrevGroup | Nav::Open | Nav::FocusDown => {}
        }
        Some(ConductorSection::Detail)
    }

    fn move_cursor(&mut self, step: impl FnOnce(&mut ViewportCursor<ConductorItem>)) {
        let before = self.view.cursor();
        step(&mut self.view);
        if self.view.cursor() != before {
            self.refresh_detail(true);
        }
    }

    /// Regenerates the detail text from the row under the cursor.
    fn refresh_detail(&mut self, to_top: bool) {
        let width = self.width.max(20);
        let lines = detail_lines(&self.theme, self.data.as_ref(), self.selected(), width);
        if to_top {
            self.detail.replace(lines);
        } else {
            self.detail.set_lines(lines);
        }
    }

    pub fn render(&self, focus: Option<ConductorSection>) -> Vec<StyledLine> {
        let theme = &self.theme;
        let Some(data) = &self.data else {
            return vec![StyledLine::styled("  No conductor data", theme.dim())];
        };
        if self.view.items().is_empty() {
            return vec![StyledLine::styled("  No features", theme.dim())];
        }

        let (list_height, detail_height) = self.split();
        let show_cursor = match focus {
            Some(ConductorSection::List) => true,
            Some(ConductorSection::Detail) => detail_height == 0,
            None => false,
        };
        let mut lines: Vec<StyledLine> = self
            .view
            .visible()
            .map(|(index, item)| {
                let mut line = self.render_item(data, item);
                if self.width > 0 {
                    line = line.truncate(self.width);
                }
                if show_cursor && index == self.view.cursor() && item.selectable() {
                    line = line.highlight(theme.cursor_bg);
                }
                line
            })
            .collect();

        if detail_height > 0 {
            lines.resize(list_height, StyledLine::new());
            let divider_style = if focus == Some(ConductorSection::Detail) {
                theme.accent()
            } else {
                Style::fg(theme.border)
            };
            lines.push(StyledLine::styled("─".repeat(self.width.max(1)), divider_style));
            lines.extend(self.detail.visible());
        }
        lines
    }

    fn render_item(&self, data: &ConductorData, item: &ConductorItem) -> StyledLine {
        let theme = &self.theme;
        match item {
            ConductorItem::Spacer(_) => StyledLine::new(),
            ConductorItem::Header(group) => {
                let (title, suffix, style) = match group {
                    ConductorGroup::Features => (
                        "Features".to_string(),
                        format!("{}/{} passed", data.passed(), data.total()),
                        theme.staged().bold(),
                    ),
                    ConductorGroup::Session => {
                        let session = data.session.as_ref();
                        (
                            session
                                .map(|s| format!("Session #{}", s.number))
                                .unwrap_or_else(|| "Session".to_string()),
                            session.map(|s| s.status.clone()).unwrap_or_default(),
                            theme.staged().bold(),
                        )
                    }
                    ConductorGroup::Quality => (
                        format!("Quality ({})", data.quality.len()),
                        String::new(),
                        theme.accent().bold(),
                    ),
                    ConductorGroup::Memories => (
                        "Memories".to_string(),
                        data.memories.len().to_string(),
                        theme.dim(),
                    ),
                };
                self.section_header(*group, &title, &suffix, style)
            }
            ConductorItem::Feature { index, .. } => match data.features.get(*index) {
                Some(feature) => self.render_feature(feature),
                None => StyledLine::new(),
            },
            ConductorItem::Handoff { field, text } => StyledLine::plain("  ")
                .with(format!("{:<6}", field.label()), theme.accent2())
                .with(" ", Style::default())
                .with(text.clone(), theme.text()),
            ConductorItem::Quality { .. } => StyledLine::plain("  ").with(
                format!("⚠ {}", item.label().unwrap_or_default()),
                theme.accent(),
            ),
            ConductorItem::Memory { index, .. } => {
                let name = data
                    .memories
                    .get(*index)
                    .map(|memory| memory.name.clone())
                    .unwrap_or_default();
                StyledLine::plain("  ").with(name, theme.dim())
            }
        }
    }

    /// `▼ Title ──── suffix`, the divider filling the panel width.
    fn section_header(&self, group: ConductorGroup, title: &str, suffix: &str, style: Style) -> StyledLine {
        let theme = &self.theme;
        let chevron = if self.collapse.is_collapsed(&group) {
            "▶"
        } else {
            "▼"
        };
        let suffix = if suffix.is_empty() {
            String::new()
        } else {
            format!(" {suffix}")
        };
        let used = display_width(chevron) + display_width(title) + 2 + display_width(&suffix);
        let divider = self.width.saturating_sub(used).max(1);
        StyledLine::styled(chevron, theme.dim())
            .with(" ", Style::default())
            .with(title.to_string(), style)
            .with(" ", Style::default())
            .with("─".repeat(divider), Style::fg(theme.border))
            .with(suffix, theme.dim())
    }

    fn render_feature(&self, feature: &Feature) -> StyledLine {
        let theme = &self.theme;
        let (indicator, style) = feature_marker(theme, feature.status);
        let mut badges = StyledLine::new();
        if feature.status == FeatureStatus::Failed && feature.attempt_count > 1 {
            badges.push(format!(" [x{}]", feature.attempt_count), theme.error());
        }
        if feature.status == FeatureStatus::InProgress {
            badges.push(" active", theme.accent().bold());
        }
        let room = self.width.saturating_sub(5 + badges.width()).max(5);
        let mut line = StyledLine::plain("  ")
            .with(indicator, style)
            .with(" ", Style::default())
            .with(truncate(&feature.description, room), style);
        line.spans.extend(badges.spans);
        line
    }
}

fn feature_marker(theme: &Theme, status: FeatureStatus) -> (&'static str, Style) {
    match status {
        FeatureStatus::Passed => ("✓", theme.staged()),
        FeatureStatus::InProgress => ("●", theme.unstaged()),
        FeatureStatus::Failed => ("✗", theme.error()),
        FeatureStatus::Blocked => ("◌", theme.dim()),
        FeatureStatus::Pending => ("○", theme.dim()),
    }
}

struct DetailWriter<'a> {
    theme: &'a Theme,
    width: usize,
    lines: Vec<StyledLine>,
}

impl DetailWriter<'_> {
    fn blank(&mut self) {
        self.lines.push(StyledLine::new());
    }

    fn line(&mut self, line: StyledLine) {
        self.lines.push(line);
    }

    /// `  label    value`, wrapping the value under itself.
    fn row(&mut self, label: &str, value: &str, style: Style) {
        let wrapped = word_wrap(value, self.width.saturating_sub(VALUE_INDENT + 2));
        for (n, part) in wrapped.into_iter().enumerate() {
            let lead = if n == 0 {
                StyledLine::plain("  ").with(
                    format!("{label:<width$}", width = VALUE_INDENT - 2),
                    self.theme.accent2().bold(),
                )
            } else {
                StyledLine::plain(" ".repeat(VALUE_INDENT))
            };
            self.lines.push(lead.with(part, style));
        }
    }

    /// Free text indented by two columns.
    fn text(&mut self, text: &str, style: Style) {
        for part in word_wrap(text, self.width.saturating_sub(4)) {
            self.lines.push(StyledLine::plain("  ").with(part, style));
        }
    }
}

/// Detail text for `item`. A pure function of the data and the row.
pub fn detail_lines(
    theme: &Theme,
    data: Option<&ConductorData>,
    item: Option<&ConductorItem>,
    width: usize,
) -> Vec<StyledLine> {
    let mut out = DetailWriter {
        theme,
        width,
        lines: Vec::new(),
    };
    let (Some(data), Some(item)) = (data, item) else {
        out.line(StyledLine::styled("  Select an item for details", theme.dim()));
        return out.lines;
    };

    out.blank();
    match item {
        ConductorItem::Feature { index, .. } => {
            let Some(feature) = data.features.get(*index) else {
                return out.lines;
            };
            let (_, status_style) = feature_marker(theme, feature.status);
            out.row("desc", &feature.description, theme.text());
            out.row("status", feature.status.label(), status_style);
            out.row("phase", &feature.phase.to_string(), theme.dim());
            out.row("cat", &feature.category, theme.dim());
            if feature.attempt_count > 1 {
                out.row("tries", &feature.attempt_count.to_string(), theme.error());
            }
            if let Some(hash) = feature.commit_hash.as_deref().filter(|h| !h.is_empty()) {
                let short: String = hash.chars().take(12).collect();
                out.row("commit", &short, theme.branch());
            }
            if let Some(error) = feature.last_error.as_deref().filter(|e| !e.is_empty()) {
                out.row("error", error, theme.error());
            }
        }
        ConductorItem::Memory { index, .. } => {
            let Some(memory) = data.memories.get(*index) else {
                return out.lines;
            };
            out.row("name", &memory.name, theme.text());
            if !memory.tags.is_empty() {
                out.row("tags", &memory.tags.join(", "), theme.dim());
            }
            out.blank();
            for line in memory.content.lines() {
                let line = truncate(line, width.saturating_sub(4));
                out.line(StyledLine::plain("  ").with(line, theme.text()));
            }
        }
        ConductorItem::Quality { reflection, .. } => {
            if let Some(q) = data.quality.get(*reflection) {
                out.row("type", &q.reflection_type, theme.dim());
            }
            out.blank();
            out.text(&item.label().unwrap_or_default(), theme.accent());
        }
        ConductorItem::Handoff { .. } => {
            out.text(&item.label().unwrap_or_default(), theme.text());
            if let Some(handoff) = &data.handoff {
                out.blank();
                if !handoff.current_task.is_empty() {
                    out.row("task", &handoff.current_task, theme.text());
                }
                for (n, step) in handoff.next_steps.iter().enumerate() {
                    out.row(if n == 0 { "next" } else { "" }, step, theme.text());
                }
                if !handoff.blockers.is_empty() {
                    out.row("blocks", &handoff.blockers.join(", "), theme.error());
                }
            }
        }
        ConductorItem::Header(ConductorGroup::Features) => {
            let total = data.total();
            let passed = data.passed();
            out.row("total", &format!("{total} features"), theme.text());
            out.row("passed", &passed.to_string(), theme.staged());
            if total > passed {
                out.row("remain", &(total - passed).to_string(), theme.unstaged());
            }
            let count = |status: FeatureStatus| data.features.iter().filter(|f| f.status == status).count();
            for (label, status, style) in [
                ("active", FeatureStatus::InProgress, theme.unstaged()),
                ("failed", FeatureStatus::Failed, theme.error()),
                ("blocked", FeatureStatus::Blocked, theme.dim()),
            ] {
                let n = count(status);
                if n > 0 {
                    out.row(label, &n.to_string(), style);
                }
            }
        }
        ConductorItem::Header(ConductorGroup::Session) => {
            if let Some(session) = &data.session {
                out.row("session", &format!("#{}", session.number), theme.text());
                out.row("status", &session.status, theme.dim());
                if !session.progress_notes.is_empty() {
                    out.row("notes", &session.progress_notes, theme.text());
                }
            }
        }
        ConductorItem::Header(ConductorGroup::Quality) => {
            out.row(
                "issues",
                &format!("{} unresolved", data.quality.len()),
                theme.accent(),
            );
            let sum = |pick: fn(&crate::source::QualityReflection) -> usize| {
                data.quality.iter().map(pick).sum::<usize>()
            };
            let totals = [
                ("short", sum(|q| q.shortcuts_taken.len()), "shortcuts"),
                ("tests", sum(|q| q.tests_skipped.len()), "skipped"),
                ("limits", sum(|q| q.known_limitations.len()), "known"),
                ("defer", sum(|q| q.deferred_work.len()), "deferred"),
                ("debt", sum(|q| q.technical_debt.len()), "items"),
            ];
            for (label, n, noun) in totals {
                if n > 0 {
                    out.row(label, &format!("{n} {noun}"), theme.text());
                }
            }
        }
        ConductorItem::Header(ConductorGroup::Memories) => {
            out.row("saved", &format!("{} memories", data.memories.len()), theme.text());
            for memory in &data.memories {
                let mut line = StyledLine::plain("  ")
                    .with(truncate(&memory.name, width.saturating_sub(8)), theme.text());
                if !memory.tags.is_empty() {
                    line.push(format!(" [{}]", memory.tags.join(",")), theme.dim());
                }
                out.line(line);
            }
        }
        ConductorItem::Spacer(_) => {
            out.lines.clear();
            out.line(StyledLine::styled("  Select an item for details", theme.dim()));
        }
    }
    out.lines
}

#[cfg(test)]
mod tests;
