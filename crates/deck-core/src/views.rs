//! Full-screen views that replace the panel layout: the file diff and the
//! commit message editor.

use std::path::Path;
use std::path::PathBuf;

use crate::detail::DetailViewport;
use crate::input::LineInput;
use crate::keys::Key;
use crate::source::FileEntry;
use crate::source::RepoStatus;
use crate::text::StyledLine;
use crate::theme::Theme;

/// Header and footer rows around the diff body.
const DIFF_CHROME_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Close,
    Stage { repo: PathBuf, path: String },
    Unstage { repo: PathBuf, path: String },
    Consumed,
}

#[derive(Debug, Clone)]
pub struct DiffView {
    repo: PathBuf,
    file: FileEntry,
    body: DetailViewport,
}

impl DiffView {
    pub fn new(theme: &Theme, repo: PathBuf, file: FileEntry, diff: &str) -> Self {
        let lines: Vec<StyledLine> = if diff.trim().is_empty() {
            vec![StyledLine::styled("No changes", theme.dim())]
        } else {
            diff.lines()
                .map(|line| StyledLine::styled(line, theme.diff_line(line)))
                .collect()
        };
        Self {
            repo,
            file,
            body: DetailViewport::new(lines),
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn file(&self) -> &FileEntry {
        &self.file
    }

    pub fn body(&self) -> &DetailViewport {
        &self.body
    }

    pub fn set_size(&mut self, _width: usize, height: usize) {
        self.body.set_height(height.saturating_sub(DIFF_CHROME_ROWS));
    }

    pub fn handle_key(&mut self, key: Key) -> DiffOutcome {
        match key {
            Key::Esc | Key::Char('q') => return DiffOutcome::Close,
            Key::Char('s') => {
                return DiffOutcome::Stage {
                    repo: self.repo.clone(),
                    path: self.file.path.clone(),
                }
            }
            Key::Char('u') => {
                return DiffOutcome::Unstage {
                    repo: self.repo.clone(),
                    path: self.file.path.clone(),
                }
            }
            Key::Down | Key::Char('j') => self.body.scroll_by(1),
            Key::Up | Key::Char('k') => self.body.scroll_by(-1),
            Key::PageDown | Key::Char(' ') | Key::Ctrl('d') => self.body.page_down(),
            Key::PageUp | Key::Ctrl('u') => self.body.page_up(),
            Key::Home | Key::Char('g') => self.body.to_top(),
            Key::End | Key::Char('G') => self.body.to_bottom(),
            _ => {}
        }
        DiffOutcome::Consumed
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        let mut lines = vec![StyledLine::styled(
            format!(" Diff: {}", self.file.path),
            theme.status_bar().bold(),
        )];
        lines.extend(self.body.visible());
        lines.push(StyledLine::styled(
            "j/k: scroll  s: stage  u: unstage  q/esc: close",
            theme.dim(),
        ));
        lines
    }
}

/// Conventional commit types, in selector order. No selection means no
/// prefix.
pub const CONVENTIONAL_TYPES: [&str; 10] = [
    "feat", "fix", "refactor", "docs", "test", "chore", "perf", "style", "ci", "build",
];

/// Index of the conventional type `message` starts with, as `type:` or
/// `type(scope)`.
pub fn detect_type(message: &str) -> Option<usize> {
    CONVENTIONAL_TYPES.iter().position(|name| {
        message
            .get(..name.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(name))
            && matches!(message[name.len()..].chars().next(), Some(':' | '('))
    })
}

/// `message` without a leading `type: ` or `type(scope): `.
pub fn strip_type_prefix(message: &str) -> &str {
    let Some(index) = detect_type(message) else {
        return message;
    };
    let tail = &message[CONVENTIONAL_TYPES[index].len()..];
    if let Some(rest) = tail.strip_prefix(':') {
        return rest.trim_start();
    }
    match tail.find("):") {
        Some(end) => tail[end + 2..].trim_start(),
        None => message,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Cancel,
    Commit { repo: PathBuf, message: String },
    Consumed,
}

#[derive(Debug, Clone)]
pub struct CommitView {
    repo: PathBuf,
    name: String,
    branch: String,
    staged: usize,
    message: LineInput,
    selected_type: Option<usize>,
    error: Option<String>,
    /// Set between Enter and the commit result; further Enters are ignored.
    pending: bool,
}

impl CommitView {
    pub fn new(repo: &RepoStatus) -> Self {
        Self {
            repo: repo.path.clone(),
            name: repo.name.clone(),
            branch: repo.branch.clone(),
            staged: repo.staged_count(),
            message: LineInput::default(),
            selected_type: None,
            error: None,
            pending: false,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn message(&self) -> &str {
        self.message.value()
    }

    pub fn selected_type(&self) -> Option<&'static str> {
        self.selected_type.map(|index| CONVENTIONAL_TYPES[index])
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// A failed commit keeps the editor open with the message intact.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.pending = false;
    }

    pub fn handle_key(&mut self, key: Key) -> CommitOutcome {
        match key {
            Key::Esc => return CommitOutcome::Cancel,
            Key::Enter => {
                if self.pending {
                    return CommitOutcome::Consumed;
                }
                let message = self.message.trimmed();
                if strip_type_prefix(message).is_empty() {
                    self.error = Some("Commit message is empty".to_string());
                    return CommitOutcome::Consumed;
                }
                let message = message.to_string();
                self.pending = true;
                self.error = None;
                return CommitOutcome::Commit {
                    repo: self.repo.clone(),
                    message,
                };
            }
            Key::Tab => self.cycle_type(true),
            Key::BackTab => self.cycle_type(false),
            other => {
                if self.message.handle_key(other) {
                    self.selected_type = detect_type(self.message.value());
                }
            }
        }
        CommitOutcome::Consumed
    }

    /// Steps through the types and "none", rewriting the message prefix.
    fn cycle_type(&mut self, forward: bool) {
        let slots = CONVENTIONAL_TYPES.len() + 1;
        // Slot 0 is "none".
        let current = self.selected_type.map_or(0, |index| index + 1);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.selected_type = next.checked_sub(1);

        let stripped = strip_type_prefix(self.message.value()).to_string();
        let value = match self.selected_type() {
            None => stripped,
            Some(name) if stripped.is_empty() => format!("{name}: "),
            Some(name) => format!("{name}: {stripped}"),
        };
        self.message.set(value);
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        let mut lines = vec![
            StyledLine::styled("Commit to ", theme.header())
                .with(self.name.clone(), theme.accent().bold())
                .with(format!(" ({})", self.branch), theme.branch()),
            StyledLine::styled(
                format!(
                    "{} staged file{}",
                    self.staged,
                    if self.staged == 1 { "" } else { "s" }
                ),
                theme.staged(),
            ),
            StyledLine::new(),
        ];

        let mut selector = StyledLine::styled("Type: ", theme.dim());
        for (index, name) in CONVENTIONAL_TYPES.iter().enumerate() {
            if self.selected_type == Some(index) {
                selector.push(format!("[{name}]"), theme.accent().bold());
            } else {
                selector.push(format!(" {name} "), theme.muted());
            }
        }
        if self.selected_type.is_none() {
            selector.push("[none]", theme.accent().bold());
        } else {
            selector.push(" none ", theme.muted());
        }
        lines.push(selector);
        lines.push(StyledLine::new());

        lines.push(
            self.message
                .render(theme, "> ", "Write your commit message...", !self.pending),
        );
        lines.push(StyledLine::new());
        if let Some(error) = &self.error {
            lines.push(StyledLine::styled(format!("Error: {error}"), theme.error()));
        } else if self.pending {
            lines.push(StyledLine::styled("Committing…", theme.dim()));
        }
        lines.push(StyledLine::styled(
            "tab/shift-tab: type  enter: commit  esc: cancel",
            theme.dim(),
        ));
        lines
    }
}
