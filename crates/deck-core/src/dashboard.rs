//! Project and repository panel.
//!
//! Two modes: the project list, and the detail tree of one project
//! (repo → staged / unstaged / docs → optional folder → file).

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DisplayConfig;
use crate::config::PriorityRule;
use crate::cursor::ViewportCursor;
use crate::keys::Nav;
use crate::list::CollapseSet;
use crate::list::FlatItem;
use crate::list::FlatList;
use crate::list::FlatListBuilder;
use crate::source::base_name;
use crate::source::FileEntry;
use crate::source::FileStatus;
use crate::source::ProjectStatus;
use crate::source::RepoStatus;
use crate::source::Staging;
use crate::text::Style;
use crate::text::StyledLine;
use crate::theme::Theme;
use crate::tier::resolve_tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeGroup {
    Staged,
    Unstaged,
    Docs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashKind {
    ProjectHeader,
    RepoHeader,
    SectionHeader,
    DocHeader,
    FolderHeader,
    File,
}

/// Repo indices are global: the position of the repo when all projects'
/// repos are laid end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashItem {
    Project {
        project: usize,
    },
    Repo {
        project: usize,
        repo: usize,
    },
    Section {
        repo: usize,
        group: ChangeGroup,
    },
    Docs {
        repo: usize,
    },
    Folder {
        repo: usize,
        group: ChangeGroup,
        dir: String,
    },
    File {
        repo: usize,
        group: ChangeGroup,
        file: usize,
        path: String,
        dir: String,
        tier: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashKey {
    Project(usize),
    Repo(usize),
    Section(usize, ChangeGroup),
    Docs(usize),
    Folder(usize, ChangeGroup, String),
    File(usize, ChangeGroup, String),
}

/// Collapse state is keyed by repo path so it stays with the repo when the
/// project list is edited.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DashCollapse {
    Repo(PathBuf),
    Docs(PathBuf),
    Folder(PathBuf, String),
}

impl DashCollapse {
    fn repo_path(&self) -> &Path {
        match self {
            Self::Repo(path) | Self::Docs(path) | Self::Folder(path, _) => path,
        }
    }
}

impl DashItem {
    pub fn kind(&self) -> DashKind {
        match self {
            Self::Project { .. } => DashKind::ProjectHeader,
            Self::Repo { .. } => DashKind::RepoHeader,
            Self::Section { .. } => DashKind::SectionHeader,
            Self::Docs { .. } => DashKind::DocHeader,
            Self::Folder { .. } => DashKind::FolderHeader,
            Self::File { .. } => DashKind::File,
        }
    }

    pub fn repo(&self) -> Option<usize> {
        match self {
            Self::Project { .. } => None,
            Self::Repo { repo, .. }
            | Self::Section { repo, .. }
            | Self::Docs { repo }
            | Self::Folder { repo, .. }
            | Self::File { repo, .. } => Some(*repo),
        }
    }
}

impl FlatItem for DashItem {
    type Key = DashKey;

    fn key(&self) -> DashKey {
        match self {
            Self::Project { project } => DashKey::Project(*project),
            Self::Repo { repo, .. } => DashKey::Repo(*repo),
            Self::Section { repo, group } => DashKey::Section(*repo, *group),
            Self::Docs { repo } => DashKey::Docs(*repo),
            Self::Folder { repo, group, dir } => DashKey::Folder(*repo, *group, dir.clone()),
            Self::File {
                repo, group, path, ..
            } => DashKey::File(*repo, *group, path.clone()),
        }
    }

    fn selectable(&self) -> bool {
        self.kind() != DashKind::SectionHeader
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashMode {
    AllProjects,
    Project(usize),
}

/// Ordering and grouping options for file rows.
#[derive(Debug, Clone, Copy)]
pub struct SortRules<'a> {
    pub group_folders: bool,
    pub group_docs: bool,
    pub priority: &'a [PriorityRule],
}

fn is_doc(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".md")
}

fn repo_offset(projects: &[ProjectStatus], project: usize) -> usize {
    projects.iter().take(project).map(|p| p.repos.len()).sum()
}

/// Builds the dashboard rows. Pure: same inputs, same rows.
pub fn flatten(
    projects: &[ProjectStatus],
    mode: DashMode,
    collapse: &CollapseSet<DashCollapse>,
    rules: SortRules<'_>,
) -> FlatList<DashItem> {
    let mut out = FlatListBuilder::new();
    match mode {
        DashMode::AllProjects => {
            for project in 0..projects.len() {
                out.push_group(DashItem::Project { project });
            }
        }
        DashMode::Project(project) => {
            let Some(status) = projects.get(project) else {
                return out.finish();
            };
            let offset = repo_offset(projects, project);
            for (local, repo_status) in status.repos.iter().enumerate() {
                flatten_repo(
                    &mut out,
                    project,
                    offset + local,
                    repo_status,
                    collapse,
                    rules,
                );
            }
        }
    }
    out.finish()
}

fn flatten_repo(
    out: &mut FlatListBuilder<DashItem>,
    project: usize,
    repo: usize,
    status: &RepoStatus,
    collapse: &CollapseSet<DashCollapse>,
    rules: SortRules<'_>,
) {
    out.push_group(DashItem::Repo { project, repo });
    if status.error.is_some() || collapse.is_collapsed(&DashCollapse::Repo(status.path.clone())) {
        return;
    }

    let mut staged = Vec::new();
    let mut unstaged = Vec::new();
    let mut docs = Vec::new();
    for (index, file) in status.files.iter().enumerate() {
        if rules.group_docs && is_doc(&file.path) {
            docs.push(index);
        } else if file.staging == Staging::Staged {
            staged.push(index);
        } else {
            unstaged.push(index);
        }
    }

    for (group, mut indices) in [
        (ChangeGroup::Staged, staged),
        (ChangeGroup::Unstaged, unstaged),
    ] {
        if indices.is_empty() {
            continue;
        }
        // Stable: equal keys keep git's order.
        indices.sort_by_cached_key(|&index| {
            let path = status.files[index].path.as_str();
            let dir = if rules.group_folders {
                status.files[index].dir().to_string()
            } else {
                String::new()
            };
            (dir, resolve_tier(path, rules.priority), path.to_string())
        });
        out.push(DashItem::Section { repo, group });
        let mut last_dir: Option<String> = None;
        for index in indices {
            let file = &status.files[index];
            let dir = file.dir().to_string();
            let foldered = rules.group_folders && dir != ".";
            if foldered && last_dir.as_deref() != Some(dir.as_str()) {
                out.push(DashItem::Folder {
                    repo,
                    group,
                    dir: dir.clone(),
                });
                last_dir = Some(dir.clone());
            }
            if foldered && collapse.is_collapsed(&DashCollapse::Folder(status.path.clone(), dir.clone())) {
                continue;
            }
            out.push(DashItem::File {
                repo,
                group,
                file: index,
                path: file.path.clone(),
                dir,
                tier: resolve_tier(&file.path, rules.priority),
            });
        }
    }

    if docs.is_empty() {
        return;
    }
    out.push(DashItem::Docs { repo });
    if collapse.is_collapsed(&DashCollapse::Docs(status.path.clone())) {
        return;
    }
    docs.sort_by(|&a, &b| status.files[a].path.cmp(&status.files[b].path));
    for index in docs {
        let file = &status.files[index];
        out.push(DashItem::File {
            repo,
            group: ChangeGroup::Docs,
            file: index,
            path: file.path.clone(),
            dir: file.dir().to_string(),
            tier: 3,
        });
    }
}

/// Outcome of `Enter` on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashOpen {
    EnteredProject(usize),
    Toggled,
    File { repo: usize, file: usize },
    Nothing,
}

pub struct Dashboard {
    theme: Arc<Theme>,
    projects: Vec<ProjectStatus>,
    mode: DashMode,
    collapse: CollapseSet<DashCollapse>,
    group_folders: bool,
    group_docs: bool,
    priority: Vec<PriorityRule>,
    view: ViewportCursor<DashItem>,
    width: usize,
    height: usize,
}

impl Dashboard {
    pub fn new(theme: Arc<Theme>, display: &DisplayConfig) -> Self {
        Self {
            theme,
            projects: Vec::new(),
            mode: DashMode::AllProjects,
            collapse: CollapseSet::default(),
            group_folders: display.group_folders,
            group_docs: display.group_docs,
            priority: display.resolved_priority(),
            view: ViewportCursor::default(),
            width: 0,
            height: 1,
        }
    }

    pub fn mode(&self) -> DashMode {
        self.mode
    }

    pub fn projects(&self) -> &[ProjectStatus] {
        &self.projects
    }

    pub fn view(&self) -> &ViewportCursor<DashItem> {
        &self.view
    }

    /// Replaces the snapshot. New repos start collapsed, docs groups always
    /// start collapsed, and state for vanished repos is dropped.
    pub fn set_projects(&mut self, projects: Vec<ProjectStatus>) {
        let alive: BTreeSet<&Path> = projects
            .iter()
            .flat_map(|project| project.repos.iter())
            .map(|repo| repo.path.as_path())
            .collect();
        self.collapse.retain(|key| alive.contains(key.repo_path()));
        for path in alive {
            self.collapse.default_collapsed(DashCollapse::Repo(path.to_path_buf()));
            self.collapse.default_collapsed(DashCollapse::Docs(path.to_path_buf()));
        }
        self.projects = projects;
        if let DashMode::Project(project) = self.mode {
            if project >= self.projects.len() {
                self.mode = DashMode::AllProjects;
            }
        }
        self.rebuild();
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.view.ensure_visible(self.list_height());
    }

    /// One row is reserved for the panel title.
    fn list_height(&self) -> usize {
        self.height.saturating_sub(1).max(1)
    }

    fn rules(&self) -> SortRules<'_> {
        SortRules {
            group_folders: self.group_folders,
            group_docs: self.group_docs,
            priority: &self.priority,
        }
    }

    fn flatten(&self) -> FlatList<DashItem> {
        flatten(&self.projects, self.mode, &self.collapse, self.rules())
    }

    fn rebuild(&mut self) {
        let list = self.flatten();
        self.view.rebuild_against(list);
        self.view.ensure_visible(self.list_height());
    }

    /// Handles a navigation key. Returns `None` when the key means nothing
    /// here so the caller can route it elsewhere.
    pub fn handle_nav(&mut self, nav: Nav) -> Option<DashOpen> {
        match nav {
            Nav::Up => self.view.move_by(-1),
            Nav::Down => self.view.move_by(1),
            Nav::PageUp => self.view.move_by(-(self.list_height() as isize)),
            Nav::PageDown => self.view.move_by(self.list_height() as isize),
            Nav::Top => self.view.move_by(-(self.view.items().len() as isize)),
            Nav::Bottom => self.view.move_by(self.view.items().len() as isize),
            Nav::NextGroup => self.view.jump_to_next_group(),
            Nav::PrevGroup => self.view.jump_to_prev_group(),
            Nav::Open => return Some(self.open()),
            Nav::Back => {
                self.exit_project();
            }
            Nav::FocusLeft | Nav::FocusRight | Nav::FocusUp | Nav::FocusDown => return None,
        }
        Some(DashOpen::Nothing)
    }

    pub fn open(&mut self) -> DashOpen {
        let Some(item) = self.view.selected().cloned() else {
            return DashOpen::Nothing;
        };
        match item {
            DashItem::Project { project } => {
                self.enter_project(project);
                DashOpen::EnteredProject(project)
            }
            DashItem::File { repo, file, .. } => DashOpen::File { repo, file },
            other => match self.collapse_key(&other) {
                Some(key) => {
                    self.collapse.toggle(key);
                    self.rebuild();
                    DashOpen::Toggled
                }
                None => DashOpen::Nothing,
            },
        }
    }

    pub fn enter_project(&mut self, project: usize) {
        if project >= self.projects.len() {
            return;
        }
        self.mode = DashMode::Project(project);
        self.view = ViewportCursor::with_height(self.flatten(), self.list_height());
    }

    /// Back to the project list, cursor on the project just left.
    pub fn exit_project(&mut self) -> bool {
        let DashMode::Project(previous) = self.mode else {
            return false;
        };
        self.mode = DashMode::AllProjects;
        self.view = ViewportCursor::with_height(self.flatten(), self.list_height());
        self.view
            .select_where(|item| *item == DashItem::Project { project: previous });
        true
    }

    pub fn selected(&self) -> Option<&DashItem> {
        self.view.selected()
    }

    pub fn repo(&self, index: usize) -> Option<&RepoStatus> {
        self.projects
            .iter()
            .flat_map(|project| project.repos.iter())
            .nth(index)
    }

    pub fn selected_repo_index(&self) -> Option<usize> {
        self.selected().and_then(DashItem::repo)
    }

    pub fn selected_repo(&self) -> Option<&RepoStatus> {
        self.selected_repo_index().and_then(|index| self.repo(index))
    }

    pub fn selected_file(&self) -> Option<(&RepoStatus, &FileEntry)> {
        match self.selected()? {
            DashItem::File { repo, file, .. } => {
                let status = self.repo(*repo)?;
                Some((status, status.files.get(*file)?))
            }
            _ => None,
        }
    }

    pub fn active_project(&self) -> Option<&ProjectStatus> {
        match self.mode {
            DashMode::Project(project) => self.projects.get(project),
            DashMode::AllProjects => None,
        }
    }

    pub fn render(&self, focused: bool) -> Vec<StyledLine> {
        let theme = &self.theme;
        let title = match self.active_project() {
            Some(project) => format!(" {} ", project.name),
            None => " Projects ".to_string(),
        };
        let title_style = if focused {
            theme.accent().bold()
        } else {
            theme.dim()
        };
        let mut lines = vec![StyledLine::styled(title, title_style)];

        if self.view.items().is_empty() {
            lines.push(StyledLine::new());
            lines.push(StyledLine::styled(
                "  No repos configured or no changes found.",
                theme.dim(),
            ));
            return lines;
        }

        for (index, item) in self.view.visible() {
            let mut line = self.render_item(item);
            if self.width > 0 {
                line = line.truncate(self.width);
            }
            if index == self.view.cursor() && item.selectable() {
                line = line.highlight(theme.cursor_bg);
            }
            lines.push(line);
        }
        lines
    }

    fn collapse_key(&self, item: &DashItem) -> Option<DashCollapse> {
        let path = self.repo(item.repo()?)?.path.clone();
        match item {
            DashItem::Repo { .. } => Some(DashCollapse::Repo(path)),
            DashItem::Docs { .. } => Some(DashCollapse::Docs(path)),
            DashItem::Folder { dir, .. } => Some(DashCollapse::Folder(path, dir.clone())),
            _ => None,
        }
    }

    fn chevron(&self, item: &DashItem) -> &'static str {
        match self.collapse_key(item) {
            Some(key) if self.collapse.is_collapsed(&key) => "▶",
            _ => "▼",
        }
    }

    fn render_item(&self, item: &DashItem) -> StyledLine {
        let theme = &self.theme;
        match item {
            DashItem::Project { project } => self.render_project(*project),
            DashItem::Repo { repo, .. } => self.render_repo(item, *repo),
            DashItem::Section { group, .. } => {
                let (label, style) = match group {
                    ChangeGroup::Staged => ("Staged Changes:", theme.staged()),
                    _ => ("Unstaged Changes:", theme.unstaged()),
                };
                StyledLine::plain("    ").with(label, style.bold())
            }
            DashItem::Docs { repo } => {
                let count = self
                    .repo(*repo)
                    .map(|status| status.files.iter().filter(|f| is_doc(&f.path)).count())
                    .unwrap_or(0);
                StyledLine::plain("    ")
                    .with(self.chevron(item), theme.dim())
                    .with(format!(" Documents ({count})"), theme.dim())
            }
            DashItem::Folder { dir, .. } => StyledLine::plain("      ")
                .with(self.chevron(item), theme.dim())
                .with(format!(" {dir}/"), theme.accent()),
            DashItem::File {
                repo,
                file,
                dir,
                tier,
                ..
            } => match self.repo(*repo).and_then(|status| status.files.get(*file)) {
                Some(entry) => self.render_file(entry, dir, *tier),
                None => StyledLine::new(),
            },
        }
    }

    fn render_project(&self, project: usize) -> StyledLine {
        let theme = &self.theme;
        let Some(status) = self.projects.get(project) else {
            return StyledLine::new();
        };
        let repos = status.repos.len();
        let noun = if repos == 1 { "repo" } else { "repos" };
        let mut line = StyledLine::plain("  ▶ ")
            .with(status.name.clone(), theme.header())
            .with(format!(" ({repos} {noun})"), theme.dim());
        let changes = status.change_count();
        if status.has_errors() {
            line.push(" ⚠ errors", theme.error());
        } else if changes == 0 {
            line.push(" — clean", theme.dim());
        } else {
            line.push(format!(" {changes} changes"), theme.dim());
        }
        line
    }

    fn render_repo(&self, item: &DashItem, repo: usize) -> StyledLine {
        let theme = &self.theme;
        let Some(status) = self.repo(repo) else {
            return StyledLine::new();
        };
        let chevron = self.chevron(item);
        let mut line = StyledLine::plain(format!("  {chevron} ")).with(status.name.clone(), theme.header());
        if let Some(error) = &status.error {
            line.push(format!(" (error: {error})"), theme.error());
            return line;
        }
        line.push(" [", theme.dim())
            .push(status.branch.clone(), theme.branch())
            .push("]", theme.dim());
        if status.files.is_empty() {
            line.push(" — clean", theme.dim());
        } else {
            line.push(
                format!(
                    " {} staged, {} unstaged",
                    status.staged_count(),
                    status.unstaged_count()
                ),
                theme.dim(),
            );
        }

        let mut badge = StyledLine::new();
        if status.ahead > 0 {
            badge.push(format!("↑ {} to push", status.ahead), theme.staged());
        }
        if status.behind > 0 {
            if status.ahead > 0 {
                badge.push(" ", Style::default());
            }
            badge.push(format!("↓ {} to pull", status.behind), theme.accent());
        }
        if badge.width() > 0 && self.width >= 20 {
            line.push_right_aligned(badge, self.width);
        }
        line
    }

    fn render_file(&self, entry: &FileEntry, dir: &str, tier: u8) -> StyledLine {
        let theme = &self.theme;
        let (indicator, base_style) = match entry.staging {
            Staging::Staged => ("✓", theme.staged()),
            Staging::Unstaged => ("○", theme.unstaged()),
        };
        let style = match tier {
            1 => base_style,
            3 => theme.muted(),
            _ => theme.dim(),
        };
        let under_folder = self.group_folders && dir != ".";
        let indent = if under_folder { "        " } else { "      " };
        let status_style = match entry.status {
            FileStatus::Untracked => theme.muted(),
            FileStatus::Deleted => theme.error(),
            _ => style,
        };

        let mut line = StyledLine::plain(indent)
            .with(indicator, base_style)
            .with(" ", Style::default())
            .with(format!("[{}]", entry.status.code()), status_style)
            .with(" ", Style::default());
        let shown = |path: &str| {
            if under_folder {
                base_name(path).to_string()
            } else {
                path.to_string()
            }
        };
        if let Some(orig) = &entry.orig_path {
            line.push(shown(orig), style)
                .push(" → ", style)
                .push(shown(&entry.path), style);
        } else {
            line.push(shown(&entry.path), style);
        }
        line
    }
}
