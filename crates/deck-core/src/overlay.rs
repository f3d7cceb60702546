//! Modal overlays stacked above the panels.
//!
//! While the stack is non-empty the top overlay receives every key. An
//! overlay either consumes the key or reports that it closed, and the host
//! pops it and acts on the result.

use std::path::PathBuf;

use tracing::debug;

use crate::branch_picker::BranchPicker;
use crate::config::ProjectConfig;
use crate::feature_linker::FeatureLinker;
use crate::focus::ActiveView;
use crate::keys::Key;
use crate::project_manager::ProjectManager;
use crate::text::StyledLine;
use crate::theme::Theme;

/// What a closing overlay hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    Dismissed,
    SwitchBranch {
        repo: PathBuf,
        branch: String,
    },
    CreateBranch {
        repo: PathBuf,
        branch: String,
    },
    LinkFeature {
        repo: PathBuf,
        feature_id: String,
        hash: String,
        message: String,
    },
    Projects {
        projects: Vec<ProjectConfig>,
        changed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Consumed,
    Closed(OverlayResult),
}

#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
    BranchPicker(BranchPicker),
    FeatureLinker(FeatureLinker),
    ProjectManager(ProjectManager),
}

impl Overlay {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::BranchPicker(_) => "branch picker",
            Self::FeatureLinker(_) => "feature linker",
            Self::ProjectManager(_) => "project manager",
        }
    }

    /// Top-level view this overlay stands for, if it replaces one.
    pub fn view(&self) -> Option<ActiveView> {
        match self {
            Self::BranchPicker(_) => Some(ActiveView::BranchPicker),
            Self::ProjectManager(_) => Some(ActiveView::ProjectManager),
            Self::Help | Self::FeatureLinker(_) => None,
        }
    }

    /// True while the overlay is taking typed text, so printable keys must
    /// not trigger global shortcuts.
    pub fn captures_text(&self) -> bool {
        match self {
            Self::Help => false,
            Self::BranchPicker(picker) => picker.captures_text(),
            Self::FeatureLinker(linker) => linker.captures_text(),
            Self::ProjectManager(manager) => manager.captures_text(),
        }
    }

    pub fn set_size(&mut self, _width: usize, height: usize) {
        match self {
            Self::FeatureLinker(linker) => linker.set_size(height),
            Self::ProjectManager(manager) => manager.set_size(height),
            Self::Help | Self::BranchPicker(_) => {}
        }
    }

    pub fn handle_key(&mut self, key: Key) -> OverlayOutcome {
        match self {
            Self::Help => OverlayOutcome::Closed(OverlayResult::Dismissed),
            Self::BranchPicker(picker) => picker.handle_key(key),
            Self::FeatureLinker(linker) => linker.handle_key(key),
            Self::ProjectManager(manager) => manager.handle_key(key),
        }
    }

    pub fn render(&self, theme: &Theme) -> Vec<StyledLine> {
        match self {
            Self::Help => help_lines(theme),
            Self::BranchPicker(picker) => picker.render(theme),
            Self::FeatureLinker(linker) => linker.render(theme),
            Self::ProjectManager(manager) => manager.render(theme),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayHost {
    stack: Vec<Overlay>,
    size: (usize, usize),
}

impl OverlayHost {
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Option<&Overlay> {
        self.stack.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.stack.iter()
    }

    pub fn push(&mut self, mut overlay: Overlay) {
        debug!(overlay = overlay.name(), depth = self.stack.len() + 1, "overlay opened");
        overlay.set_size(self.size.0, self.size.1);
        self.stack.push(overlay);
    }

    pub fn pop(&mut self) -> Option<Overlay> {
        let overlay = self.stack.pop();
        if let Some(overlay) = &overlay {
            debug!(overlay = overlay.name(), depth = self.stack.len(), "overlay closed");
        }
        overlay
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.size = (width, height);
        for overlay in &mut self.stack {
            overlay.set_size(width, height);
        }
    }

    /// Routes a key to the top overlay. `None` when no overlay is open.
    /// A closing overlay is popped before its result is returned.
    pub fn handle_key(&mut self, key: Key) -> Option<OverlayOutcome> {
        let outcome = self.stack.last_mut()?.handle_key(key);
        if let OverlayOutcome::Closed(_) = outcome {
            self.pop();
        }
        Some(outcome)
    }

    pub fn is_help_open(&self) -> bool {
        matches!(self.top(), Some(Overlay::Help))
    }

    /// The innermost overlay standing for a top-level view.
    pub fn view(&self) -> Option<ActiveView> {
        self.stack.iter().rev().find_map(Overlay::view)
    }
}

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k ↑/↓", "move"),
            ("tab/shift-tab", "next / previous repo or section"),
            ("pgup/pgdn home/end", "page, top, bottom"),
            ("enter", "open, expand or collapse"),
            ("esc", "back"),
        ],
    ),
    (
        "Focus",
        &[
            ("←/→ ctrl-h/l", "focus panel left / right"),
            ("ctrl-j/k", "focus section down / up"),
            ("g", "toggle graph"),
            ("C", "toggle conductor"),
        ],
    ),
    (
        "Staging",
        &[
            ("s/u", "stage / unstage file or repo"),
            ("S/U", "stage / unstage all"),
            ("d", "diff selected file"),
            ("c", "commit staged changes"),
        ],
    ),
    (
        "Actions",
        &[
            ("b", "branches"),
            ("p", "project manager"),
            ("f", "link graph commit to a feature"),
            ("r", "refresh"),
        ],
    ),
    ("General", &[("?", "toggle help"), ("q ctrl-c", "quit")]),
];

pub fn help_lines(theme: &Theme) -> Vec<StyledLine> {
    let mut lines = vec![StyledLine::styled("Help", theme.accent().bold()), StyledLine::new()];
    for (group, keys) in HELP {
        lines.push(StyledLine::styled(*group, theme.header()));
        for (key, description) in *keys {
            lines.push(
                StyledLine::styled(format!("  {key:<20}"), theme.accent2())
                    .with(*description, theme.dim()),
            );
        }
        lines.push(StyledLine::new());
    }
    lines.push(StyledLine::styled("press any key to close", theme.muted()));
    lines
}
