//! Branch switch / create overlay for the repository under the dashboard
//! cursor.

use std::path::PathBuf;

use crate::cursor::ViewportCursor;
use crate::input::LineInput;
use crate::keys::Key;
use crate::list::FlatItem;
use crate::list::FlatListBuilder;
use crate::overlay::OverlayOutcome;
use crate::overlay::OverlayResult;
use crate::source::BranchInfo;
use crate::text::StyledLine;
use crate::theme::Theme;

pub const BRANCH_LIST_HEIGHT: usize = 15;
pub const BRANCH_PREFIXES: [&str; 5] = ["feat/", "fix/", "chore/", "refactor/", ""];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRow {
    pub index: usize,
    pub name: String,
}

impl FlatItem for BranchRow {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Pick,
    Filter,
    Create,
}

#[derive(Debug, Clone)]
pub struct BranchPicker {
    repo: PathBuf,
    branches: Vec<BranchInfo>,
    mode: PickerMode,
    filter: LineInput,
    view: ViewportCursor<BranchRow>,
    name: LineInput,
    prefix: usize,
}

impl BranchPicker {
    pub fn new(repo: PathBuf, branches: Vec<BranchInfo>) -> Self {
        let mut picker = Self {
            repo,
            branches,
            mode: PickerMode::Pick,
            filter: LineInput::default(),
            view: ViewportCursor::default(),
            name: LineInput::default(),
            prefix: 0,
        };
        picker.rebuild();
        picker
    }

    pub fn repo(&self) -> &std::path::Path {
        &self.repo
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn view(&self) -> &ViewportCursor<BranchRow> {
        &self.view
    }

    pub fn selected(&self) -> Option<&BranchInfo> {
        self.view
            .selected()
            .and_then(|row| self.branches.get(row.index))
    }

    pub fn prefix(&self) -> &'static str {
        BRANCH_PREFIXES[self.prefix % BRANCH_PREFIXES.len()]
    }

    /// Full name the create form would produce.
    pub fn new_branch_name(&self) -> String {
        format!("{}{}", self.prefix(), self.name.trimmed())
    }

    pub fn captures_text(&self) -> bool {
        matches!(self.mode, PickerMode::Filter | PickerMode::Create)
    }

    fn list_height(&self) -> usize {
        self.view.items().len().clamp(1, BRANCH_LIST_HEIGHT)
    }

    /// Rows are always derived from the full branch list and the filter.
    fn rebuild(&mut self) {
        let query = self.filter.value().to_lowercase();
        let mut builder = FlatListBuilder::new();
        for (index, branch) in self.branches.iter().enumerate() {
            if query.is_empty() || branch.name.to_lowercase().contains(&query) {
                builder.push(BranchRow {
                    index,
                    name: branch.name.clone(),
                });
            }
        }
        self.view.rebuild_against(builder.finish());
        let height = self.list_height();
        self.view.ensure_visible(height);
    }

    pub fn handle_key(&mut self, key: Key) -> OverlayOutcome {
        match self.mode {
            PickerMode::Pick => self.pick_key(key),
            PickerMode::Filter => self.filter_key(key),
            PickerMode::Create => self.create_key(key),
        }
    }

    fn pick_key(&mut self, key: Key) -> OverlayOutcome {
        match key {
            Key::Esc | Key::Char('q') => return OverlayOutcome::Closed(OverlayResult::Dismissed),
            Key::Char('j') | Key::Down => self.view.move_by(1),
            Key::Char('k') | Key::Up => self.view.move_by(-1),
            Key::Enter => return self.switch(),
            Key::Char('/') => self.mode = PickerMode::Filter,
            Key::Char('n') => {
                self.mode = PickerMode::Create;
                self.name.clear();
                self.prefix = 0;
            }
            _ => {}
        }
        OverlayOutcome::Consumed
    }

    fn filter_key(&mut self, key: Key) -> OverlayOutcome {
        match key {
            Key::Esc => {
                self.mode = PickerMode::Pick;
                self.filter.clear();
                self.rebuild();
            }
            Key::Down | Key::Ctrl('n') => self.view.move_by(1),
            Key::Up | Key::Ctrl('p') => self.view.move_by(-1),
            Key::Enter => return self.switch(),
            other => {
                if self.filter.handle_key(other) {
                    self.rebuild();
                }
            }
        }
        OverlayOutcome::Consumed
    }

    fn create_key(&mut self, key: Key) -> OverlayOutcome {
        match key {
            Key::Esc => self.mode = PickerMode::Pick,
            Key::Tab => self.prefix = (self.prefix + 1) % BRANCH_PREFIXES.len(),
            Key::BackTab => {
                self.prefix = (self.prefix + BRANCH_PREFIXES.len() - 1) % BRANCH_PREFIXES.len()
            }
            Key::Enter => {
                if self.name.trimmed().is_empty() {
                    return OverlayOutcome::Consumed;
                }
                return OverlayOutcome::Closed(OverlayResult::CreateBranch {
                    repo: self.repo.clone(),
                    branch: self.new_branch_name(),
                });
            }
            other => {
                self.name.handle_key(other);
            }
        }
        OverlayOutcome::Consumed
    }

    fn switch(&self) -> OverlayOutcome {
        match self.selected() {
            Some(branch) => OverlayOutcome::Closed(OverlayResult::SwitchBranch {
                repo: self.repo.clone(),
                branch: branch.name.clone(),
            }),
            None => OverlayOutcome::Consumed,
        }
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        let mut lines = vec![
            StyledLine::styled("Branches ", theme.header())
                .with(self.repo.display().to_string(), theme.dim()),
            StyledLine::new(),
        ];
        if self.mode == PickerMode::Create {
            self.render_create(theme, &mut lines);
            return lines;
        }

        lines.push(self.filter.render(
            theme,
            "/ ",
            "filter branches…",
            self.mode == PickerMode::Filter,
        ));
        lines.push(StyledLine::new());

        for (index, row) in self.view.visible() {
            let Some(branch) = self.branches.get(row.index) else {
                continue;
            };
            let (marker, style) = if branch.is_current {
                ("* ", theme.branch().bold())
            } else {
                ("  ", theme.text())
            };
            let mut line = StyledLine::plain(marker).with(branch.name.clone(), style);
            if !branch.upstream.is_empty() {
                line.push(format!(" → {}", branch.upstream), theme.dim());
            }
            if index == self.view.cursor() {
                line = line.highlight(theme.cursor_bg);
            }
            lines.push(line);
        }
        if self.view.items().is_empty() {
            lines.push(StyledLine::styled("  no matching branches", theme.dim()));
        }

        lines.push(StyledLine::new());
        lines.push(StyledLine::styled(
            "j/k: navigate  /: filter  enter: switch  n: new branch  esc: close",
            theme.dim(),
        ));
        lines
    }

    fn render_create(&self, theme: &Theme, lines: &mut Vec<StyledLine>) {
        lines.push(StyledLine::styled("New Branch", theme.header()));
        lines.push(StyledLine::new());

        let mut prefixes = StyledLine::styled("Prefix: ", theme.dim());
        for (index, prefix) in BRANCH_PREFIXES.iter().enumerate() {
            let label = if prefix.is_empty() { "(none)" } else { prefix };
            if index == self.prefix {
                prefixes.push(format!("[{label}]"), theme.accent().bold());
            } else {
                prefixes.push(format!(" {label} "), theme.dim());
            }
            prefixes.push(" ", theme.text());
        }
        lines.push(prefixes);
        lines.push(StyledLine::new());

        if !self.name.is_empty() {
            lines.push(
                StyledLine::styled("Preview: ", theme.dim())
                    .with(self.new_branch_name(), theme.branch().bold()),
            );
            lines.push(StyledLine::new());
        }
        lines.push(self.name.render(theme, "> ", "branch name…", true));
        lines.push(StyledLine::new());
        lines.push(StyledLine::styled(
            "tab: cycle prefix  enter: create  esc: back",
            theme.dim(),
        ));
    }
}
