//! Commit graph pane.
//!
//! Three stacked regions: the graph itself, the detail of the selected
//! commit, and that commit's files with inline, lazily fetched diffs.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::cursor::ViewportCursor;
use crate::keys::Nav;
use crate::list::FlatItem;
use crate::list::FlatListBuilder;
use crate::source::CommitDetail;
use crate::source::CommitFileStat;
use crate::source::ConductorData;
use crate::source::GraphLine;
use crate::text::truncate;
use crate::text::Style;
use crate::text::StyledLine;
use crate::theme::Theme;

pub const GRAPH_PERCENT: usize = 30;
pub const DETAIL_PERCENT: usize = 25;
pub const GRAPH_MIN_HEIGHT: usize = 3;
const MIN_USABLE: usize = 6;
const MESSAGE_LINES: usize = 3;

/// Heights of (graph, detail, files). Without a detail the graph takes the
/// whole pane. With one, two rows go to dividers.
pub fn region_heights(height: usize, has_detail: bool) -> (usize, usize, usize) {
    if !has_detail {
        return (height.max(1), 0, 0);
    }
    let usable = height.saturating_sub(2).max(MIN_USABLE);
    let graph = usable * GRAPH_PERCENT / 100;
    let detail = usable * DETAIL_PERCENT / 100;
    let files = usable - graph - detail;
    (graph.max(GRAPH_MIN_HEIGHT), detail, files)
}

fn conventional_prefix() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^(?i)(feat|fix|chore|refactor|docs|test|style|perf|ci|build)(\([^)]*\))?!?:")
                .ok()
        })
        .as_ref()
}

/// Highlights a conventional-commit prefix such as `feat(ui):`.
pub fn styled_message(theme: &Theme, message: &str) -> StyledLine {
    let prefix_len = conventional_prefix()
        .and_then(|re| re.find(message))
        .map(|found| found.end())
        .unwrap_or(0);
    StyledLine::styled(&message[..prefix_len], theme.accent().bold())
        .with(&message[prefix_len..], theme.text())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphSection {
    #[default]
    Commits,
    Files,
}

/// One graph line. Only commit lines are selectable; connector lines are
/// skipped by the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRow {
    pub line: usize,
    pub is_commit: bool,
}

impl FlatItem for GraphRow {
    type Key = usize;

    fn key(&self) -> usize {
        self.line
    }

    fn selectable(&self) -> bool {
        self.is_commit
    }
}

/// Requests the pane wants its host to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphFetch {
    CommitDetail { repo: PathBuf, hash: String },
    FileDiff { repo: PathBuf, hash: String, path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFeature {
    pub hash: String,
    pub id: String,
    pub description: String,
}

/// A row of the files region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRow<'a> {
    Header(usize),
    Diff(&'a str),
    Loading,
    NoChanges,
}

/// File list of one commit. Expanded files inline their diff, so the row
/// of each header depends on what is expanded above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiffList {
    files: Vec<CommitFileStat>,
    cursor: usize,
    scroll: usize,
    height: usize,
    expanded: BTreeSet<String>,
    diffs: BTreeMap<String, String>,
}

impl Default for FileDiffList {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            cursor: 0,
            scroll: 0,
            height: 1,
            expanded: BTreeSet::new(),
            diffs: BTreeMap::new(),
        }
    }
}

impl FileDiffList {
    pub fn new(files: Vec<CommitFileStat>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn files(&self) -> &[CommitFileStat] {
        &self.files
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn selected(&self) -> Option<&CommitFileStat> {
        self.files.get(self.cursor)
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.diffs.contains_key(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|file| file.path == path)
    }

    /// Rows below a header: the diff's lines, or one placeholder row while
    /// loading or when the diff is empty.
    fn body_lines(&self, path: &str) -> usize {
        if !self.expanded.contains(path) {
            return 0;
        }
        match self.diffs.get(path) {
            Some(diff) if !diff.is_empty() => diff.lines().count(),
            _ => 1,
        }
    }

    /// Row of the header of file `index`; past the end, the total row count.
    pub fn header_line(&self, index: usize) -> usize {
        self.files
            .iter()
            .take(index)
            .map(|file| 1 + self.body_lines(&file.path))
            .sum()
    }

    pub fn total_lines(&self) -> usize {
        self.header_line(self.files.len())
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.ensure_cursor_visible();
    }

    /// Scrolls through an expanded diff before moving to the next file.
    pub fn down(&mut self) {
        let Some(file) = self.files.get(self.cursor) else {
            return;
        };
        if self.expanded.contains(&file.path) {
            let end = self.header_line(self.cursor + 1);
            if self.scroll + self.height < end {
                self.scroll += 1;
                return;
            }
        }
        if self.cursor + 1 < self.files.len() {
            self.cursor += 1;
            self.ensure_cursor_visible();
        }
    }

    /// Scrolls back to the current header before moving to the previous file.
    pub fn up(&mut self) {
        if self.files.is_empty() {
            return;
        }
        if self.scroll > self.header_line(self.cursor) {
            self.scroll -= 1;
            return;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            self.ensure_cursor_visible();
        }
    }

    /// Expands or collapses the current file. Returns the path when its diff
    /// still has to be fetched.
    pub fn toggle(&mut self) -> Option<String> {
        let path = self.files.get(self.cursor)?.path.clone();
        let fetch = if self.expanded.remove(&path) {
            None
        } else {
            self.expanded.insert(path.clone());
            (!self.diffs.contains_key(&path)).then_some(path)
        };
        self.ensure_cursor_visible();
        fetch
    }

    /// Caches a fetched diff. Returns false for paths not in this commit.
    pub fn set_diff(&mut self, path: &str, diff: &str) -> bool {
        if !self.contains(path) {
            return false;
        }
        self.diffs
            .insert(path.to_string(), diff.trim_end_matches('\n').to_string());
        self.ensure_cursor_visible();
        true
    }

    fn ensure_cursor_visible(&mut self) {
        let target = self.header_line(self.cursor);
        if target < self.scroll {
            self.scroll = target;
        } else if target >= self.scroll + self.height {
            self.scroll = target + 1 - self.height;
        }
        let max_scroll = self.total_lines().saturating_sub(self.height);
        self.scroll = self.scroll.min(max_scroll);
    }

    pub fn rows(&self) -> Vec<FileRow<'_>> {
        let mut rows = Vec::new();
        for (index, file) in self.files.iter().enumerate() {
            rows.push(FileRow::Header(index));
            if !self.expanded.contains(&file.path) {
                continue;
            }
            match self.diffs.get(&file.path) {
                Some(diff) if !diff.is_empty() => rows.extend(diff.lines().map(FileRow::Diff)),
                Some(_) => rows.push(FileRow::NoChanges),
                None => rows.push(FileRow::Loading),
            }
        }
        rows
    }
}

pub struct GraphPane {
    theme: Arc<Theme>,
    repo: Option<PathBuf>,
    lines: Vec<GraphLine>,
    view: ViewportCursor<GraphRow>,
    rendered: Vec<StyledLine>,
    rendered_width: usize,
    linked: Vec<LinkedFeature>,
    /// Hash of the last detail request, so re-entering a commit does not
    /// fetch again.
    requested: Option<String>,
    requests: Vec<GraphFetch>,
    detail: Option<CommitDetail>,
    /// Selection the current detail was fetched for.
    detail_key: String,
    /// Last failed detail fetch as (hash, message).
    detail_error: Option<(String, String)>,
    files: FileDiffList,
    width: usize,
    height: usize,
}

impl GraphPane {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self {
            theme,
            repo: None,
            lines: Vec::new(),
            view: ViewportCursor::default(),
            rendered: Vec::new(),
            rendered_width: 0,
            linked: Vec::new(),
            requested: None,
            requests: Vec::new(),
            detail: None,
            detail_key: String::new(),
            detail_error: None,
            files: FileDiffList::default(),
            width: 0,
            height: 1,
        }
    }

    pub fn repo(&self) -> Option<&Path> {
        self.repo.as_deref()
    }

    pub fn lines(&self) -> &[GraphLine] {
        &self.lines
    }

    pub fn view(&self) -> &ViewportCursor<GraphRow> {
        &self.view
    }

    pub fn files(&self) -> &FileDiffList {
        &self.files
    }

    /// Replaces the graph and resets every cursor and cache, then asks for
    /// the first commit's detail.
    pub fn set_graph(&mut self, repo: PathBuf, lines: Vec<GraphLine>) {
        let mut builder = FlatListBuilder::new();
        for (line, graph_line) in lines.iter().enumerate() {
            builder.push(GraphRow {
                line,
                is_commit: graph_line.is_commit && !graph_line.hash.is_empty(),
            });
        }
        self.repo = Some(repo);
        self.lines = lines;
        self.view = ViewportCursor::new(builder.finish());
        self.requested = None;
        self.requests.clear();
        self.detail = None;
        self.detail_key.clear();
        self.detail_error = None;
        self.files = FileDiffList::default();
        self.rebuild_cache();
        self.apply_heights();
        self.request_detail();
    }

    /// Drops everything, e.g. when no repository is selected.
    pub fn clear(&mut self) {
        self.repo = None;
        self.lines.clear();
        self.view = ViewportCursor::default();
        self.rendered.clear();
        self.requested = None;
        self.requests.clear();
        self.detail = None;
        self.detail_key.clear();
        self.detail_error = None;
        self.files = FileDiffList::default();
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height.max(1);
        if width != self.rendered_width {
            self.rebuild_cache();
        }
        self.apply_heights();
    }

    pub fn heights(&self) -> (usize, usize, usize) {
        region_heights(
            self.height,
            self.detail.is_some() || self.detail_error.is_some(),
        )
    }

    fn apply_heights(&mut self) {
        let (graph, _, files) = self.heights();
        self.view.ensure_visible(graph);
        self.files.set_height(files);
    }

    /// Records which features are linked to commits. Invalidates the
    /// rendered lines since they carry the feature badge.
    pub fn set_linked_features(&mut self, data: Option<&ConductorData>) {
        let linked: Vec<LinkedFeature> = data
            .map(|data| {
                data.features
                    .iter()
                    .filter_map(|feature| {
                        let hash = feature.commit_hash.as_deref().filter(|h| !h.is_empty())?;
                        Some(LinkedFeature {
                            hash: hash.to_string(),
                            id: feature.id.clone(),
                            description: feature.description.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        if linked != self.linked {
            self.linked = linked;
            self.rebuild_cache();
        }
    }

    pub fn linked_feature(&self, hash: &str) -> Option<&LinkedFeature> {
        if hash.is_empty() {
            return None;
        }
        self.linked
            .iter()
            .find(|link| link.hash.starts_with(hash) || hash.starts_with(&link.hash))
    }

    pub fn selected_line(&self) -> Option<&GraphLine> {
        self.view
            .selected()
            .and_then(|row| self.lines.get(row.line))
    }

    pub fn selected_hash(&self) -> Option<&str> {
        self.selected_line().map(|line| line.hash.as_str())
    }

    /// The detail, only while it belongs to the selected commit.
    pub fn detail(&self) -> Option<&CommitDetail> {
        let current = self.selected_hash()?;
        self.detail
            .as_ref()
            .filter(|_| self.detail_key == current)
    }

    /// Accepts a fetched detail. Dropped when the selection has moved on.
    pub fn set_commit_detail(&mut self, hash: &str, detail: CommitDetail) -> bool {
        if self.selected_hash() != Some(hash) {
            debug!(hash, "dropping stale commit detail");
            return false;
        }
        self.files = FileDiffList::new(detail.files.clone());
        self.detail = Some(detail);
        self.detail_key = hash.to_string();
        self.detail_error = None;
        self.apply_heights();
        true
    }

    /// Records a failed detail fetch. The commit is requested again the next
    /// time it is selected.
    pub fn set_commit_detail_error(&mut self, hash: &str, err: &str) -> bool {
        if self.requested.as_deref() == Some(hash) {
            self.requested = None;
        }
        if self.selected_hash() != Some(hash) {
            debug!(hash, "dropping stale commit detail error");
            return false;
        }
        self.detail_error = Some((hash.to_string(), err.to_string()));
        self.apply_heights();
        true
    }

    /// The failure message, only while it belongs to the selected commit.
    pub fn detail_error(&self) -> Option<&str> {
        let current = self.selected_hash()?;
        self.detail_error
            .as_ref()
            .filter(|(hash, _)| hash == current)
            .map(|(_, err)| err.as_str())
    }

    /// Accepts a fetched file diff for the current detail.
    pub fn set_file_diff(&mut self, hash: &str, path: &str, diff: &str) -> bool {
        if self.detail().is_none() || self.detail_key != hash {
            debug!(hash, path, "dropping stale file diff");
            return false;
        }
        self.files.set_diff(path, diff)
    }

    /// Requests the selected commit's detail unless it was the last one asked for.
    fn request_detail(&mut self) {
        let (Some(repo), Some(hash)) = (self.repo.clone(), self.selected_hash()) else {
            return;
        };
        if self.requested.as_deref() == Some(hash) {
            return;
        }
        let hash = hash.to_string();
        self.requested = Some(hash.clone());
        self.requests.push(GraphFetch::CommitDetail { repo, hash });
    }

    pub fn drain_requests(&mut self) -> Vec<GraphFetch> {
        std::mem::take(&mut self.requests)
    }

    /// Handles a key for `section`. Returns the section owning input
    /// afterwards, or `None` when the key is for the router.
    pub fn handle_nav(&mut self, section: GraphSection, nav: Nav) -> Option<GraphSection> {
        match section {
            GraphSection::Commits => self.handle_commit_nav(nav),
            GraphSection::Files => self.handle_file_nav(nav),
        }
    }

    fn handle_commit_nav(&mut self, nav: Nav) -> Option<GraphSection> {
        let page = self.heights().0 as isize;
        let len = self.view.items().len() as isize;
        match nav {
            Nav::Up => self.view.move_by(-1),
            Nav::Down => self.view.move_by(1),
            Nav::PageUp => self.view.move_by(-page),
            Nav::PageDown => self.view.move_by(page),
            Nav::Top => self.view.move_by(-len),
            Nav::Bottom => self.view.move_by(len),
            Nav::Open | Nav::FocusDown => {
                let has_files = self.detail().is_some_and(|detail| !detail.files.is_empty());
                if has_files {
                    return Some(GraphSection::Files);
                }
            }
            Nav::NextGroup | Nav::PrevGroup => {}
            Nav::Back | Nav::FocusLeft | Nav::FocusRight | Nav::FocusUp => return None,
        }
        self.request_detail();
        Some(GraphSection::Commits)
    }

    fn handle_file_nav(&mut self, nav: Nav) -> Option<GraphSection> {
        match nav {
            Nav::Up => self.files.up(),
            Nav::Down => self.files.down(),
            Nav::PageUp | Nav::Top => {
                for _ in 0..self.heights().2.max(1) {
                    self.files.up();
                }
            }
            Nav::PageDown | Nav::Bottom => {
                for _ in 0..self.heights().2.max(1) {
                    self.files.down();
                }
            }
            Nav::Open => {
                if let (Some(repo), Some(path)) = (self.repo.clone(), self.files.toggle()) {
                    self.requests.push(GraphFetch::FileDiff {
                        repo,
                        hash: self.detail_key.clone(),
                        path,
                    });
                }
            }
            Nav::Back | Nav::FocusUp => return Some(GraphSection::Commits),
            Nav::FocusLeft | Nav::FocusRight => return None,
            Nav::NextGroup | Nav::PrevGroup | Nav::FocusDown => {}
        }
        Some(GraphSection::Files)
    }

    fn rebuild_cache(&mut self) {
        self.rendered = self
            .lines
            .iter()
            .map(|line| self.render_line(line))
            .collect();
        self.rendered_width = self.width;
    }

    fn render_line(&self, line: &GraphLine) -> StyledLine {
        let theme = &self.theme;
        let mut out = StyledLine::new();
        let mut column = 0usize;
        for ch in line.graph_chars.chars() {
            match ch {
                ' ' => {
                    out.push(" ", Style::default());
                    column += 1;
                }
                '*' => {
                    out.push("●", theme.lane(column));
                    column += 1;
                }
                '|' | '/' | '\\' => {
                    out.push(ch.to_string(), theme.lane(column));
                    column += 1;
                }
                other => {
                    out.push(other.to_string(), theme.lane(column));
                }
            }
        }
        if !line.is_commit {
            return out;
        }
        if !line.hash.is_empty() {
            let short: String = line.hash.chars().take(7).collect();
            out.push(short, theme.dim()).push(" ", Style::default());
        }
        if !line.refs.is_empty() {
            out.push(line.refs.clone(), theme.accent())
                .push(" ", Style::default());
        }
        if let Some(link) = self.linked_feature(&line.hash) {
            out.push(format!("[{}]", link.id), theme.accent2())
                .push(" ", Style::default());
        }
        out.spans
            .extend(styled_message(theme, &line.message).spans);
        if self.width > 0 {
            out = out.truncate(self.width);
        }
        out
    }

    pub fn render(&self, focus: Option<GraphSection>) -> Vec<StyledLine> {
        let theme = &self.theme;
        if self.lines.is_empty() {
            return vec![StyledLine::styled("  No commits", theme.dim())];
        }
        let (graph_height, detail_height, files_height) = self.heights();
        let mut out: Vec<StyledLine> = self
            .view
            .visible()
            .map(|(index, row)| {
                let line = self.rendered.get(row.line).cloned().unwrap_or_default();
                if index == self.view.cursor() && row.selectable() {
                    line.highlight(theme.cursor_bg)
                } else {
                    line
                }
            })
            .collect();
        if self.detail.is_none() && self.detail_error.is_none() {
            return out;
        }

        out.resize(graph_height, StyledLine::new());
        let divider = StyledLine::styled("─".repeat(self.width.max(1)), Style::fg(theme.border));
        out.push(divider.clone());

        let mut detail = match (self.detail(), self.detail_error()) {
            (Some(detail), _) => self.detail_lines(detail),
            (None, Some(err)) => vec![
                StyledLine::new(),
                StyledLine::styled(format!("  error: {err}"), theme.error()),
            ],
            (None, None) => vec![StyledLine::new(), StyledLine::styled("  Loading…", theme.dim())],
        };
        detail.resize(detail_height, StyledLine::new());
        out.extend(detail);
        out.push(divider);

        let mut files: Vec<StyledLine> = if self.detail().is_some() {
            self.file_lines(focus == Some(GraphSection::Files))
        } else {
            Vec::new()
        };
        files.resize(files_height, StyledLine::new());
        out.extend(files);
        out
    }

    fn detail_lines(&self, detail: &CommitDetail) -> Vec<StyledLine> {
        let theme = &self.theme;
        let label = |name: &str| StyledLine::plain("  ").with(format!("{name:<6}"), theme.accent2().bold()).with("  ", Style::default());
        let date = detail
            .parsed_date()
            .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| detail.date.chars().take(10).collect());

        let mut lines = vec![
            StyledLine::new(),
            label("commit").with(detail.hash.chars().take(12).collect::<String>(), theme.branch()),
            label("author").with(detail.author.clone(), theme.text()),
            label("date").with(date, theme.dim()),
            StyledLine::new(),
        ];
        for message in detail.message.trim().lines().take(MESSAGE_LINES) {
            let mut line = StyledLine::plain("  ");
            line.spans.extend(styled_message(theme, message).spans);
            lines.push(line);
        }
        if detail.total_add > 0 || detail.total_del > 0 {
            lines.push(
                StyledLine::plain("  ")
                    .with(format!("+{}", detail.total_add), Style::fg(theme.diff_add))
                    .with(" ", Style::default())
                    .with(format!("-{}", detail.total_del), Style::fg(theme.diff_remove))
                    .with(format!("  {} files", detail.files.len()), theme.dim()),
            );
        }
        if let Some(link) = self.linked_feature(&detail.hash) {
            lines.push(StyledLine::new());
            lines.push(
                label("feat")
                    .with(format!("[{}] ", link.id), theme.accent2())
                    .with(link.description.clone(), theme.text()),
            );
        }
        lines
            .into_iter()
            .map(|line| if self.width > 0 { line.truncate(self.width) } else { line })
            .collect()
    }

    fn file_lines(&self, focused: bool) -> Vec<StyledLine> {
        let theme = &self.theme;
        let (_, _, height) = self.heights();
        self.files
            .rows()
            .into_iter()
            .skip(self.files.scroll())
            .take(height)
            .map(|row| {
                let line = match row {
                    FileRow::Header(index) => {
                        let Some(file) = self.files.files().get(index) else {
                            return StyledLine::new();
                        };
                        let chevron = if self.files.is_expanded(&file.path) {
                            "▼"
                        } else {
                            "▶"
                        };
                        let mut line = StyledLine::plain(format!("  {chevron} "))
                            .with(truncate(&file.path, self.width.saturating_sub(16).max(8)), theme.text());
                        if file.added > 0 || file.deleted > 0 {
                            line.push(format!(" +{}", file.added), Style::fg(theme.diff_add))
                                .push(format!(" -{}", file.deleted), Style::fg(theme.diff_remove));
                        }
                        if focused && index == self.files.cursor() {
                            line = line.highlight(theme.cursor_bg);
                        }
                        line
                    }
                    FileRow::Diff(text) => StyledLine::plain("    ").with(text, theme.diff_line(text)),
                    FileRow::Loading => StyledLine::styled("    Loading…", theme.dim()),
                    FileRow::NoChanges => StyledLine::styled("    (no changes)", theme.dim()),
                };
                if self.width > 0 {
                    line.truncate(self.width)
                } else {
                    line
                }
            })
            .collect()
    }
}
