//! Overlay for editing the configured projects and their repositories.
//!
//! Works on a private copy of the project list; closing hands the copy back
//! together with a flag saying whether anything changed.

use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::config::RepoConfig;
use crate::cursor::ViewportCursor;
use crate::input::LineInput;
use crate::keys::Key;
use crate::list::FlatItem;
use crate::list::FlatListBuilder;
use crate::overlay::OverlayOutcome;
use crate::overlay::OverlayResult;
use crate::text::StyledLine;
use crate::theme::Theme;

/// Title, blank, footer and padding.
const CHROME_ROWS: usize = 6;
const DEFAULT_HEIGHT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerRow {
    Project { project: usize },
    Repo { project: usize, repo: usize },
}

impl ManagerRow {
    pub fn project(self) -> usize {
        match self {
            Self::Project { project } | Self::Repo { project, .. } => project,
        }
    }
}

impl FlatItem for ManagerRow {
    type Key = (usize, Option<usize>);

    fn key(&self) -> Self::Key {
        match *self {
            Self::Project { project } => (project, None),
            Self::Repo { project, repo } => (project, Some(repo)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMode {
    Browse,
    AddProject { field: Field },
    AddRepo { project: usize },
    Edit { row: ManagerRow, field: Field },
    ConfirmDelete { row: ManagerRow },
}

#[derive(Debug, Clone)]
pub struct ProjectManager {
    projects: Vec<ProjectConfig>,
    changed: bool,
    mode: ManagerMode,
    view: ViewportCursor<ManagerRow>,
    name: LineInput,
    path: LineInput,
    height: usize,
}

impl ProjectManager {
    pub fn new(projects: Vec<ProjectConfig>) -> Self {
        let mut manager = Self {
            projects,
            changed: false,
            mode: ManagerMode::Browse,
            view: ViewportCursor::default(),
            name: LineInput::default(),
            path: LineInput::default(),
            height: DEFAULT_HEIGHT,
        };
        manager.rebuild();
        manager
    }

    pub fn projects(&self) -> &[ProjectConfig] {
        &self.projects
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn mode(&self) -> ManagerMode {
        self.mode
    }

    pub fn view(&self) -> &ViewportCursor<ManagerRow> {
        &self.view
    }

    pub fn captures_text(&self) -> bool {
        matches!(
            self.mode,
            ManagerMode::AddProject { .. } | ManagerMode::AddRepo { .. } | ManagerMode::Edit { .. }
        )
    }

    pub fn set_size(&mut self, height: usize) {
        self.height = height;
        self.view.ensure_visible(self.list_height());
    }

    fn list_height(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS).max(1)
    }

    fn rebuild(&mut self) {
        let mut builder = FlatListBuilder::new();
        for (project, config) in self.projects.iter().enumerate() {
            builder.push_group(ManagerRow::Project { project });
            for repo in 0..config.repos.len() {
                builder.push(ManagerRow::Repo { project, repo });
            }
        }
        self.view.rebuild_against(builder.finish());
        self.view.ensure_visible(self.list_height());
    }

    fn select(&mut self, row: ManagerRow) {
        self.view.select_where(|item| *item == row);
    }

    pub fn handle_key(&mut self, key: Key) -> OverlayOutcome {
        match self.mode {
            ManagerMode::Browse => return self.browse_key(key),
            ManagerMode::AddProject { field } => self.add_project_key(key, field),
            ManagerMode::AddRepo { project } => self.add_repo_key(key, project),
            ManagerMode::Edit { row, field } => self.edit_key(key, row, field),
            ManagerMode::ConfirmDelete { row } => self.delete_key(key, row),
        }
        OverlayOutcome::Consumed
    }

    fn browse_key(&mut self, key: Key) -> OverlayOutcome {
        let selected = self.view.selected().copied();
        match key {
            Key::Esc | Key::Char('q') | Key::Char('p') => {
                return OverlayOutcome::Closed(OverlayResult::Projects {
                    projects: self.projects.clone(),
                    changed: self.changed,
                });
            }
            Key::Char('j') | Key::Down => self.view.move_by(1),
            Key::Char('k') | Key::Up => self.view.move_by(-1),
            Key::Tab => self.view.jump_to_next_group(),
            Key::BackTab => self.view.jump_to_prev_group(),
            Key::Char('n') => {
                self.name.clear();
                self.path.clear();
                self.mode = ManagerMode::AddProject { field: Field::Name };
            }
            Key::Char('a') => {
                if let Some(row) = selected {
                    self.path.clear();
                    self.mode = ManagerMode::AddRepo {
                        project: row.project(),
                    };
                }
            }
            Key::Char('e') => {
                if let Some(row) = selected {
                    self.start_edit(row);
                }
            }
            Key::Char('x') => {
                if let Some(row) = selected {
                    self.mode = ManagerMode::ConfirmDelete { row };
                }
            }
            _ => {}
        }
        OverlayOutcome::Consumed
    }

    fn start_edit(&mut self, row: ManagerRow) {
        match row {
            ManagerRow::Project { project } => {
                let Some(config) = self.projects.get(project) else {
                    return;
                };
                self.name.set(config.name.clone());
                self.path.set(path_text(config.path.as_ref()));
                self.mode = ManagerMode::Edit {
                    row,
                    field: Field::Name,
                };
            }
            ManagerRow::Repo { project, repo } => {
                let Some(config) = self.projects.get(project).and_then(|p| p.repos.get(repo)) else {
                    return;
                };
                self.name.clear();
                self.path.set(config.path.display().to_string());
                self.mode = ManagerMode::Edit {
                    row,
                    field: Field::Path,
                };
            }
        }
    }

    fn input(&mut self, field: Field) -> &mut LineInput {
        match field {
            Field::Name => &mut self.name,
            Field::Path => &mut self.path,
        }
    }

    fn add_project_key(&mut self, key: Key, field: Field) {
        match key {
            Key::Esc => self.mode = ManagerMode::Browse,
            Key::Tab | Key::BackTab => {
                self.mode = ManagerMode::AddProject {
                    field: other_field(field),
                }
            }
            Key::Enter => {
                let name = self.name.trimmed().to_string();
                if name.is_empty() {
                    return;
                }
                let path = self.path.trimmed();
                self.projects.push(ProjectConfig {
                    name,
                    path: (!path.is_empty()).then(|| PathBuf::from(path)),
                    repos: Vec::new(),
                });
                self.finish_edit();
                self.select(ManagerRow::Project {
                    project: self.projects.len() - 1,
                });
            }
            other => {
                self.input(field).handle_key(other);
            }
        }
    }

    fn add_repo_key(&mut self, key: Key, project: usize) {
        match key {
            Key::Esc => self.mode = ManagerMode::Browse,
            Key::Enter => {
                let path = self.path.trimmed();
                if path.is_empty() {
                    return;
                }
                let Some(config) = self.projects.get_mut(project) else {
                    self.mode = ManagerMode::Browse;
                    return;
                };
                config.repos.push(RepoConfig {
                    path: PathBuf::from(path),
                    ignore_patterns: Vec::new(),
                });
                let repo = config.repos.len() - 1;
                self.finish_edit();
                self.select(ManagerRow::Repo { project, repo });
            }
            other => {
                self.path.handle_key(other);
            }
        }
    }

    fn edit_key(&mut self, key: Key, row: ManagerRow, field: Field) {
        match key {
            Key::Esc => self.mode = ManagerMode::Browse,
            Key::Tab | Key::BackTab => {
                if let ManagerRow::Project { .. } = row {
                    self.mode = ManagerMode::Edit {
                        row,
                        field: other_field(field),
                    };
                }
            }
            Key::Enter => {
                let name = self.name.trimmed().to_string();
                let path = self.path.trimmed().to_string();
                match row {
                    ManagerRow::Project { project } => {
                        if name.is_empty() {
                            return;
                        }
                        if let Some(config) = self.projects.get_mut(project) {
                            config.name = name;
                            config.path = (!path.is_empty()).then(|| PathBuf::from(path));
                        }
                    }
                    ManagerRow::Repo { project, repo } => {
                        if path.is_empty() {
                            return;
                        }
                        if let Some(config) = self
                            .projects
                            .get_mut(project)
                            .and_then(|p| p.repos.get_mut(repo))
                        {
                            config.path = PathBuf::from(path);
                        }
                    }
                }
                self.finish_edit();
            }
            other => {
                self.input(field).handle_key(other);
            }
        }
    }

    fn delete_key(&mut self, key: Key, row: ManagerRow) {
        match key {
            Key::Char('y') => {
                match row {
                    ManagerRow::Project { project } if project < self.projects.len() => {
                        self.projects.remove(project);
                    }
                    ManagerRow::Repo { project, repo } => {
                        if let Some(config) = self.projects.get_mut(project) {
                            if repo < config.repos.len() {
                                config.repos.remove(repo);
                            }
                        }
                    }
                    ManagerRow::Project { .. } => {}
                }
                self.finish_edit();
            }
            Key::Char('n') | Key::Esc => self.mode = ManagerMode::Browse,
            _ => {}
        }
    }

    fn finish_edit(&mut self) {
        self.changed = true;
        self.mode = ManagerMode::Browse;
        self.rebuild();
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        let mut lines = vec![
            StyledLine::styled("Project Manager", theme.header()),
            StyledLine::new(),
        ];
        match self.mode {
            ManagerMode::AddProject { field } => {
                lines.push(StyledLine::styled("New Project", theme.accent().bold()));
                lines.push(self.name.render(theme, "Name: ", "project name…", field == Field::Name));
                lines.push(self.path.render(theme, "Path: ", "optional path…", field == Field::Path));
                lines.push(StyledLine::new());
                lines.push(StyledLine::styled(
                    "tab: next field  enter: save  esc: cancel",
                    theme.dim(),
                ));
            }
            ManagerMode::AddRepo { project } => {
                let name = self
                    .projects
                    .get(project)
                    .map(|config| config.name.as_str())
                    .unwrap_or_default();
                lines.push(StyledLine::styled(
                    format!("Add repository to {name}"),
                    theme.accent().bold(),
                ));
                lines.push(self.path.render(theme, "Path: ", "repository path…", true));
                lines.push(StyledLine::new());
                lines.push(StyledLine::styled("enter: add  esc: cancel", theme.dim()));
            }
            ManagerMode::Edit { row, field } => {
                lines.push(StyledLine::styled("Edit", theme.accent().bold()));
                if let ManagerRow::Project { .. } = row {
                    lines.push(self.name.render(theme, "Name: ", "project name…", field == Field::Name));
                }
                lines.push(self.path.render(theme, "Path: ", "path…", field == Field::Path));
                lines.push(StyledLine::new());
                lines.push(StyledLine::styled(
                    "tab: next field  enter: save  esc: cancel",
                    theme.dim(),
                ));
            }
            ManagerMode::Browse | ManagerMode::ConfirmDelete { .. } => {
                self.render_browse(theme, &mut lines);
            }
        }
        lines
    }

    fn render_browse(&self, theme: &Theme, lines: &mut Vec<StyledLine>) {
        if self.projects.is_empty() {
            lines.push(StyledLine::styled(
                "  No projects. Press n to add one.",
                theme.dim(),
            ));
        }
        for (index, row) in self.view.visible() {
            let mut line = match *row {
                ManagerRow::Project { project } => {
                    let Some(config) = self.projects.get(project) else {
                        continue;
                    };
                    let mut line = StyledLine::styled(format!("▸ {}", config.name), theme.header());
                    if let Some(path) = &config.path {
                        line.push(format!("  {}", path.display()), theme.dim());
                    }
                    line
                }
                ManagerRow::Repo { project, repo } => {
                    let Some(config) = self.projects.get(project).and_then(|p| p.repos.get(repo))
                    else {
                        continue;
                    };
                    StyledLine::styled(format!("    {}", config.path.display()), theme.text())
                }
            };
            if index == self.view.cursor() {
                line = line.highlight(theme.cursor_bg);
            }
            lines.push(line);
        }

        lines.push(StyledLine::new());
        if let ManagerMode::ConfirmDelete { row } = self.mode {
            let what = match row {
                ManagerRow::Project { project } => self
                    .projects
                    .get(project)
                    .map(|config| format!("project '{}'", config.name)),
                ManagerRow::Repo { project, repo } => self
                    .projects
                    .get(project)
                    .and_then(|p| p.repos.get(repo))
                    .map(|config| format!("repository '{}'", config.display_name())),
            };
            lines.push(StyledLine::styled(
                format!("Delete {}? (y/n)", what.unwrap_or_default()),
                theme.error().bold(),
            ));
        } else {
            lines.push(StyledLine::styled(
                "n: new project  a: add repo  e: edit  x: delete  esc: close",
                theme.dim(),
            ));
        }
    }
}

fn other_field(field: Field) -> Field {
    match field {
        Field::Name => Field::Path,
        Field::Path => Field::Name,
    }
}

fn path_text(path: Option<&PathBuf>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn projects() -> Vec<ProjectConfig> {
        vec![
            ProjectConfig {
                name: "web".to_string(),
                path: Some(PathBuf::from("/work/web")),
                repos: vec![
                    RepoConfig {
                        path: PathBuf::from("/work/web/app"),
                        ignore_patterns: Vec::new(),
                    },
                    RepoConfig {
                        path: PathBuf::from("/work/web/api"),
                        ignore_patterns: Vec::new(),
                    },
                ],
            },
            ProjectConfig {
                name: "tools".to_string(),
                path: None,
                repos: Vec::new(),
            },
        ]
    }

    fn type_text(manager: &mut ProjectManager, text: &str) {
        for c in text.chars() {
            manager.handle_key(Key::Char(c));
        }
    }

    fn close(manager: &mut ProjectManager) -> (Vec<ProjectConfig>, bool) {
        match manager.handle_key(Key::Esc) {
            OverlayOutcome::Closed(OverlayResult::Projects { projects, changed }) => (projects, changed),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn closing_untouched_reports_no_change() {
        let mut manager = ProjectManager::new(projects());
        let (out, changed) = close(&mut manager);
        assert!(!changed);
        assert_eq!(out, projects());
    }

    #[test]
    fn add_project_needs_a_name_and_selects_it() {
        let mut manager = ProjectManager::new(projects());
        manager.handle_key(Key::Char('n'));
        manager.handle_key(Key::Enter);
        assert_eq!(manager.mode(), ManagerMode::AddProject { field: Field::Name });

        type_text(&mut manager, "docs");
        manager.handle_key(Key::Tab);
        type_text(&mut manager, "~/docs");
        manager.handle_key(Key::Enter);
        assert_eq!(manager.mode(), ManagerMode::Browse);
        assert_eq!(
            manager.view().selected(),
            Some(&ManagerRow::Project { project: 2 })
        );

        let (out, changed) = close(&mut manager);
        assert!(changed);
        assert_eq!(out[2].name, "docs");
        assert_eq!(out[2].path, Some(PathBuf::from("~/docs")));
    }

    #[test]
    fn add_repo_goes_to_the_project_under_the_cursor() {
        let mut manager = ProjectManager::new(projects());
        manager.handle_key(Key::Tab);
        manager.handle_key(Key::Char('a'));
        type_text(&mut manager, "/src/cli");
        manager.handle_key(Key::Enter);
        assert_eq!(
            manager.view().selected(),
            Some(&ManagerRow::Repo { project: 1, repo: 0 })
        );
        assert_eq!(manager.projects()[1].repos[0].path, PathBuf::from("/src/cli"));
    }

    #[test]
    fn edit_repo_path_and_rename_project() {
        let mut manager = ProjectManager::new(projects());
        manager.handle_key(Key::Down);
        manager.handle_key(Key::Char('e'));
        assert_eq!(
            manager.mode(),
            ManagerMode::Edit {
                row: ManagerRow::Repo { project: 0, repo: 0 },
                field: Field::Path,
            }
        );
        manager.handle_key(Key::Ctrl('u'));
        type_text(&mut manager, "/work/web/site");
        manager.handle_key(Key::Enter);
        assert_eq!(manager.projects()[0].repos[0].path, PathBuf::from("/work/web/site"));

        manager.handle_key(Key::Up);
        manager.handle_key(Key::Char('e'));
        manager.handle_key(Key::Ctrl('u'));
        type_text(&mut manager, "frontend");
        manager.handle_key(Key::Enter);
        assert_eq!(manager.projects()[0].name, "frontend");
        assert_eq!(manager.projects()[0].path, Some(PathBuf::from("/work/web")));
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut manager = ProjectManager::new(projects());
        manager.handle_key(Key::Char('x'));
        let text: Vec<String> = manager.render(&Theme::default()).iter().map(StyledLine::text).collect();
        assert_eq!(text.last().map(String::as_str), Some("Delete project 'web'? (y/n)"));
        manager.handle_key(Key::Char('n'));
        assert_eq!(manager.projects().len(), 2);

        manager.handle_key(Key::Char('x'));
        manager.handle_key(Key::Char('y'));
        assert_eq!(manager.projects().len(), 1);
        assert_eq!(manager.projects()[0].name, "tools");
        assert_eq!(
            manager.view().selected(),
            Some(&ManagerRow::Project { project: 0 })
        );
        assert!(manager.changed());
    }

    #[test]
    fn empty_list_renders_hint() {
        let manager = ProjectManager::new(Vec::new());
        let text: Vec<String> = manager.render(&Theme::default()).iter().map(StyledLine::text).collect();
        assert_eq!(text[2], "  No projects. Press n to add one.");
    }
}
