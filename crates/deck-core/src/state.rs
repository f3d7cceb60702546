use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crate::conductor::ConductorPanel;
use crate::config::Config;
use crate::config::ProjectConfig;
use crate::dashboard::Dashboard;
use crate::focus::ActiveView;
use crate::focus::FocusRouter;
use crate::focus::Panel;
use crate::focus::Sections;
use crate::graph::GraphPane;
use crate::overlay::OverlayHost;
use crate::source::ConductorData;
use crate::text::Style;
use crate::text::StyledLine;
use crate::theme::Theme;
use crate::views::CommitView;
use crate::views::DiffView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl FeedbackLevel {
    /// How long a message stays in the status bar.
    pub fn ttl(self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_secs(4),
            Self::Warning => Duration::from_secs(8),
            Self::Error => Duration::from_secs(12),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    /// Clock reading when posted; `None` until the first tick has been seen.
    pub posted: Option<Instant>,
}

impl Feedback {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.posted
            .is_some_and(|posted| now.saturating_duration_since(posted) > self.level.ttl())
    }
}

/// What fills the screen below the overlays.
#[derive(Debug, Clone)]
pub enum Screen {
    Dashboard,
    Diff(DiffView),
    Commit(CommitView),
}

pub struct DeckState {
    pub theme: Arc<Theme>,
    pub workspace: String,
    /// Configured projects; the project manager edits this list.
    pub projects: Vec<ProjectConfig>,
    pub graph_max_commits: usize,
    pub dashboard: Dashboard,
    pub graph: GraphPane,
    pub conductor: ConductorPanel,
    pub router: FocusRouter,
    pub overlays: OverlayHost,
    pub screen: Screen,
    pub feedback: Option<Feedback>,
    /// Last clock reading delivered by a tick.
    pub now: Option<Instant>,
    /// Repository the graph was last requested for.
    pub graph_repo: Option<PathBuf>,
    /// Repository the conductor panel follows.
    pub conductor_repo: Option<PathBuf>,
    /// Last conductor snapshot per repository.
    pub conductor_cache: BTreeMap<PathBuf, ConductorData>,
    pub size: (usize, usize),
    /// Number of the last status request issued.
    pub status_requested: u64,
    /// Number of the newest status snapshot applied; older answers are
    /// dropped.
    pub status_applied: u64,
}

impl DeckState {
    pub fn new(config: &Config) -> Self {
        let theme = Arc::new(Theme::from_config(&config.theme));
        let display = &config.display;
        Self {
            workspace: config.workspace_name().to_string(),
            projects: config.resolved_projects(),
            graph_max_commits: display.resolved_graph_max_commits(),
            dashboard: Dashboard::new(Arc::clone(&theme), display),
            graph: GraphPane::new(Arc::clone(&theme)),
            conductor: ConductorPanel::new(Arc::clone(&theme)),
            router: FocusRouter::new(
                display.show_graph,
                display.show_conductor,
                display.resolved_dashboard_width(),
            ),
            overlays: OverlayHost::default(),
            screen: Screen::Dashboard,
            feedback: None,
            now: None,
            graph_repo: None,
            conductor_repo: None,
            conductor_cache: BTreeMap::new(),
            size: (0, 0),
            status_requested: 0,
            status_applied: 0,
            theme,
        }
    }

    /// The top-level view: a view-owning overlay if one is open, otherwise
    /// the screen.
    pub fn active_view(&self) -> ActiveView {
        if let Some(view) = self.overlays.view() {
            return view;
        }
        match self.screen {
            Screen::Dashboard => ActiveView::Dashboard,
            Screen::Diff(_) => ActiveView::Diff,
            Screen::Commit(_) => ActiveView::Commit,
        }
    }

    pub fn sections(&self) -> Sections {
        Sections {
            graph_files: self
                .graph
                .detail()
                .is_some_and(|detail| !detail.files.is_empty()),
            conductor_detail: self.conductor.has_detail(),
        }
    }

    /// True while printable keys are text rather than shortcuts.
    pub fn captures_text(&self) -> bool {
        match self.overlays.top() {
            Some(overlay) => overlay.captures_text(),
            None => matches!(self.screen, Screen::Commit(_)),
        }
    }

    pub fn set_feedback(&mut self, level: FeedbackLevel, message: impl Into<String>) {
        self.feedback = Some(Feedback {
            level,
            message: message.into(),
            posted: self.now,
        });
    }

    /// Conductor snapshot of the repository under the dashboard cursor.
    pub fn selected_conductor(&self) -> Option<&ConductorData> {
        let repo = self.dashboard.selected_repo()?;
        self.conductor_cache.get(&repo.path)
    }

    /// Recomputes the column layout from the terminal size and pushes the
    /// resulting sizes into every panel, overlay and view. Focus is checked
    /// against the new layout before returning.
    pub fn apply_layout(&mut self) {
        let (width, height) = self.size;
        let sections = self.sections();
        self.router.set_size(width, height, sections);
        let layout = *self.router.layout();
        self.dashboard
            .set_size(layout.inner_width(Panel::Dashboard), layout.height);
        self.graph
            .set_size(layout.inner_width(Panel::Graph), layout.height);
        self.conductor
            .set_size(layout.inner_width(Panel::Conductor), layout.height);
        let sections = self.sections();
        self.router.enforce(sections);

        self.overlays.set_size(width, height);
        match &mut self.screen {
            Screen::Dashboard => {}
            Screen::Diff(view) => view.set_size(width, height),
            Screen::Commit(_) => {}
        }
    }

    pub fn status_bar(&self) -> StyledLine {
        let theme = &self.theme;
        let base = theme.status_bar();
        let on_bar = |style: Style| style.on(theme.status_bar_bg);
        const SEPARATOR: &str = " │ ";

        let mut line = StyledLine::styled(format!(" {}", self.workspace), base.bold());
        if let Some(repo) = self
            .dashboard
            .selected_repo()
            .filter(|repo| !repo.branch.is_empty())
        {
            line.push(SEPARATOR, base).push(repo.branch.clone(), base);
        }
        if let Some(feedback) = &self.feedback {
            let style = match feedback.level {
                FeedbackLevel::Info => base,
                FeedbackLevel::Success => on_bar(theme.staged()),
                FeedbackLevel::Warning => on_bar(theme.accent()),
                FeedbackLevel::Error => on_bar(theme.error()),
            };
            line.push(SEPARATOR, base)
                .push(feedback.message.clone(), style);
        }
        if let Some(data) = self.selected_conductor() {
            line.push(SEPARATOR, base).push(
                format!("{}/{}", data.passed(), data.total()),
                on_bar(theme.staged()),
            );
            if let Some(session) = &data.session {
                line.push(format!(" #{}", session.number), base);
            }
            if !data.quality.is_empty() {
                line.push(format!(" ⚠{}", data.quality.len()), on_bar(theme.accent()));
            }
        }
        line.push(SEPARATOR, base).push("? for help", base);
        line.highlight(theme.status_bar_bg)
    }
}
