use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::actions::DeckAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::branch_picker::BranchPicker;
use super::config::ProjectConfig;
use super::conductor::ConductorSection;
use super::dashboard::DashItem;
use super::dashboard::DashOpen;
use super::feature_linker::FeatureLinker;
use super::focus::ActiveView;
use super::focus::PanelFocus;
use super::graph::GraphFetch;
use super::graph::GraphSection;
use super::keys::Key;
use super::keys::Nav;
use super::overlay::Overlay;
use super::overlay::OverlayOutcome;
use super::overlay::OverlayResult;
use super::project_manager::ProjectManager;
use super::source::FileEntry;
use super::state::DeckState;
use super::state::FeedbackLevel;
use super::state::Screen;
use super::views::CommitOutcome;
use super::views::CommitView;
use super::views::DiffOutcome;
use super::views::DiffView;

/// Work the host performs on the core's behalf. Each effect is answered by
/// at most one [`RuntimeAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEffect {
    /// `seq` increases with every request; the answer carries it back.
    FetchStatus {
        seq: u64,
        projects: Vec<ProjectConfig>,
    },
    FetchGraph {
        repo: PathBuf,
        max_commits: usize,
    },
    FetchCommitDetail {
        repo: PathBuf,
        hash: String,
    },
    FetchCommitFileDiff {
        repo: PathBuf,
        hash: String,
        path: String,
    },
    FetchFileDiff {
        repo: PathBuf,
        file: FileEntry,
    },
    Stage {
        repo: PathBuf,
        path: String,
    },
    Unstage {
        repo: PathBuf,
        path: String,
    },
    StageAll {
        repo: PathBuf,
    },
    UnstageAll {
        repo: PathBuf,
    },
    Commit {
        repo: PathBuf,
        message: String,
    },
    FetchBranches {
        repo: PathBuf,
    },
    SwitchBranch {
        repo: PathBuf,
        branch: String,
    },
    CreateBranch {
        repo: PathBuf,
        branch: String,
    },
    FetchConductor {
        repo: PathBuf,
    },
    LinkFeature {
        repo: PathBuf,
        feature_id: String,
        hash: String,
        message: String,
    },
    SaveProjects {
        projects: Vec<ProjectConfig>,
    },
    Quit,
}

pub fn reduce(state: &mut DeckState, action: DeckAction) -> Vec<DeckEffect> {
    match action {
        DeckAction::User(user) => reduce_user(state, user),
        DeckAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut DeckState, action: UserAction) -> Vec<DeckEffect> {
    match action {
        UserAction::Resize { width, height } => {
            state.size = (width, height);
            state.apply_layout();
            Vec::new()
        }
        UserAction::Key(key) => reduce_key(state, key),
    }
}

/// Key routing: help toggle, then the top overlay, then a full-screen view,
/// then the focused panel, and finally the focus router.
fn reduce_key(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    if key == Key::Ctrl('c') {
        return vec![DeckEffect::Quit];
    }
    if key == Key::Char('?') && !state.captures_text() {
        if state.overlays.is_help_open() {
            state.overlays.pop();
        } else {
            state.overlays.push(Overlay::Help);
        }
        return Vec::new();
    }
    if let Some(outcome) = state.overlays.handle_key(key) {
        return match outcome {
            OverlayOutcome::Consumed => Vec::new(),
            OverlayOutcome::Closed(result) => overlay_closed(state, result),
        };
    }
    match state.screen {
        Screen::Diff(_) => diff_key(state, key),
        Screen::Commit(_) => commit_key(state, key),
        Screen::Dashboard => panel_key(state, key),
    }
}

fn overlay_closed(state: &mut DeckState, result: OverlayResult) -> Vec<DeckEffect> {
    match result {
        OverlayResult::Dismissed => Vec::new(),
        OverlayResult::SwitchBranch { repo, branch } => {
            vec![DeckEffect::SwitchBranch { repo, branch }]
        }
        OverlayResult::CreateBranch { repo, branch } => {
            vec![DeckEffect::CreateBranch { repo, branch }]
        }
        OverlayResult::LinkFeature {
            repo,
            feature_id,
            hash,
            message,
        } => vec![DeckEffect::LinkFeature {
            repo,
            feature_id,
            hash,
            message,
        }],
        OverlayResult::Projects { projects, changed } => {
            if !changed {
                return Vec::new();
            }
            info!(count = projects.len(), "project list edited");
            state.projects = projects.clone();
            state.graph_repo = None;
            state.conductor_repo = None;
            vec![
                DeckEffect::SaveProjects { projects },
                fetch_status(state),
            ]
        }
    }
}

fn diff_key(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    let Screen::Diff(view) = &mut state.screen else {
        return Vec::new();
    };
    match view.handle_key(key) {
        DiffOutcome::Close => {
            state.screen = Screen::Dashboard;
            vec![fetch_status(state)]
        }
        DiffOutcome::Stage { repo, path } => vec![DeckEffect::Stage { repo, path }],
        DiffOutcome::Unstage { repo, path } => vec![DeckEffect::Unstage { repo, path }],
        DiffOutcome::Consumed => Vec::new(),
    }
}

fn commit_key(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    let Screen::Commit(view) = &mut state.screen else {
        return Vec::new();
    };
    match view.handle_key(key) {
        CommitOutcome::Cancel => {
            state.screen = Screen::Dashboard;
            Vec::new()
        }
        CommitOutcome::Commit { repo, message } => vec![DeckEffect::Commit { repo, message }],
        CommitOutcome::Consumed => Vec::new(),
    }
}

fn panel_key(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    match key {
        Key::Char('q') => return vec![DeckEffect::Quit],
        Key::Char('g') => return toggle_graph(state),
        Key::Char('C') => return toggle_conductor(state),
        Key::Char('r') => return refresh(state),
        Key::Char('p') => {
            state
                .overlays
                .push(Overlay::ProjectManager(ProjectManager::new(state.projects.clone())));
            return Vec::new();
        }
        Key::Char('f') => return open_feature_linker(state),
        _ => {}
    }
    match state.router.focus() {
        PanelFocus::Dashboard => dashboard_key(state, key),
        PanelFocus::Graph(section) => graph_key(state, section, key),
        PanelFocus::Conductor(section) => conductor_key(state, section, key),
    }
}

fn dashboard_key(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    match key {
        Key::Char('s') => return stage_selected(state, true),
        Key::Char('u') => return stage_selected(state, false),
        Key::Char('S') => {
            return selected_repo_path(state)
                .map(|repo| vec![DeckEffect::StageAll { repo }])
                .unwrap_or_default()
        }
        Key::Char('U') => {
            return selected_repo_path(state)
                .map(|repo| vec![DeckEffect::UnstageAll { repo }])
                .unwrap_or_default()
        }
        Key::Char('d') => return diff_selected(state),
        Key::Char('c') => return open_commit(state),
        Key::Char('b') => {
            return selected_repo_path(state)
                .map(|repo| vec![DeckEffect::FetchBranches { repo }])
                .unwrap_or_default()
        }
        _ => {}
    }

    let Some(nav) = key.nav() else {
        return Vec::new();
    };
    match state.dashboard.handle_nav(nav) {
        None => {
            route(state, nav);
            Vec::new()
        }
        Some(DashOpen::File { repo, file }) => {
            let Some(status) = state.dashboard.repo(repo) else {
                return Vec::new();
            };
            match status.files.get(file) {
                Some(entry) => vec![DeckEffect::FetchFileDiff {
                    repo: status.path.clone(),
                    file: entry.clone(),
                }],
                None => Vec::new(),
            }
        }
        Some(_) => maybe_refresh_graph(state),
    }
}

fn graph_key(state: &mut DeckState, section: GraphSection, key: Key) -> Vec<DeckEffect> {
    let Some(nav) = key.nav() else {
        return Vec::new();
    };
    match state.graph.handle_nav(section, nav) {
        Some(next) => {
            let sections = state.sections();
            state.router.set_section(PanelFocus::Graph(next), sections);
        }
        None => route(state, nav),
    }
    graph_requests(state)
}

fn conductor_key(state: &mut DeckState, section: ConductorSection, key: Key) -> Vec<DeckEffect> {
    let Some(nav) = key.nav() else {
        return Vec::new();
    };
    match state.conductor.handle_nav(section, nav) {
        Some(next) => {
            let sections = state.sections();
            state.router.set_section(PanelFocus::Conductor(next), sections);
        }
        None => route(state, nav),
    }
    Vec::new()
}

fn route(state: &mut DeckState, nav: Nav) {
    let sections = state.sections();
    state.router.route(nav, sections);
}

fn selected_repo_path(state: &DeckState) -> Option<PathBuf> {
    state.dashboard.selected_repo().map(|repo| repo.path.clone())
}

/// `s`/`u`: a repo header stages or unstages everything, a file just itself.
fn stage_selected(state: &DeckState, stage: bool) -> Vec<DeckEffect> {
    match state.dashboard.selected() {
        Some(DashItem::Repo { .. }) => {
            let Some(repo) = selected_repo_path(state) else {
                return Vec::new();
            };
            if stage {
                vec![DeckEffect::StageAll { repo }]
            } else {
                vec![DeckEffect::UnstageAll { repo }]
            }
        }
        Some(DashItem::File { .. }) => {
            let Some((status, file)) = state.dashboard.selected_file() else {
                return Vec::new();
            };
            let repo = status.path.clone();
            let path = file.path.clone();
            if stage {
                vec![DeckEffect::Stage { repo, path }]
            } else {
                vec![DeckEffect::Unstage { repo, path }]
            }
        }
        _ => Vec::new(),
    }
}

fn diff_selected(state: &DeckState) -> Vec<DeckEffect> {
    match state.dashboard.selected_file() {
        Some((status, file)) => vec![DeckEffect::FetchFileDiff {
            repo: status.path.clone(),
            file: file.clone(),
        }],
        None => Vec::new(),
    }
}

fn open_commit(state: &mut DeckState) -> Vec<DeckEffect> {
    let Some(repo) = state.dashboard.selected_repo() else {
        return Vec::new();
    };
    if !repo.has_staged() {
        state.set_feedback(FeedbackLevel::Info, "No staged files to commit");
        return Vec::new();
    }
    state.screen = Screen::Commit(CommitView::new(repo));
    Vec::new()
}

fn open_feature_linker(state: &mut DeckState) -> Vec<DeckEffect> {
    let (Some(repo), Some(line)) = (state.graph.repo(), state.graph.selected_line()) else {
        return Vec::new();
    };
    let Some(data) = state.conductor_cache.get(repo) else {
        state.set_feedback(FeedbackLevel::Info, "No conductor data for this repo");
        return Vec::new();
    };
    match FeatureLinker::open(
        repo.to_path_buf(),
        line.hash.clone(),
        line.message.clone(),
        data,
    ) {
        Some(linker) => state.overlays.push(Overlay::FeatureLinker(linker)),
        None => state.set_feedback(FeedbackLevel::Info, "No active features to link"),
    }
    Vec::new()
}

fn toggle_graph(state: &mut DeckState) -> Vec<DeckEffect> {
    let sections = state.sections();
    let shown = state.router.toggle_graph(sections);
    state.apply_layout();
    debug!(shown, "graph toggled");
    if shown {
        state.graph_repo = None;
        state.conductor_repo = None;
        return maybe_refresh_graph(state);
    }
    Vec::new()
}

fn toggle_conductor(state: &mut DeckState) -> Vec<DeckEffect> {
    let sections = state.sections();
    let shown = state.router.toggle_conductor(sections);
    state.apply_layout();
    debug!(shown, "conductor toggled");
    if shown {
        state.conductor_repo = None;
        return maybe_refresh_graph(state);
    }
    Vec::new()
}

fn refresh(state: &mut DeckState) -> Vec<DeckEffect> {
    state.graph_repo = None;
    state.conductor_repo = None;
    let mut effects = vec![fetch_status(state)];
    effects.extend(maybe_refresh_graph(state));
    effects
}

fn fetch_status(state: &mut DeckState) -> DeckEffect {
    state.status_requested += 1;
    DeckEffect::FetchStatus {
        seq: state.status_requested,
        projects: state.projects.clone(),
    }
}

/// Requests the graph and conductor snapshot of the repository under the
/// dashboard cursor when it differs from the one last requested.
fn maybe_refresh_graph(state: &mut DeckState) -> Vec<DeckEffect> {
    let Some(repo) = selected_repo_path(state) else {
        return Vec::new();
    };
    let mut effects = Vec::new();
    if state.router.show_graph() && state.graph_repo.as_ref() != Some(&repo) {
        state.graph_repo = Some(repo.clone());
        effects.push(DeckEffect::FetchGraph {
            repo: repo.clone(),
            max_commits: state.graph_max_commits,
        });
    }
    let wants_conductor = state.router.show_graph() || state.router.show_conductor();
    if wants_conductor && state.conductor_repo.as_ref() != Some(&repo) {
        let cached = state.conductor_cache.get(&repo).cloned();
        state.graph.set_linked_features(cached.as_ref());
        state.conductor.set_data(cached);
        state.conductor_repo = Some(repo.clone());
        effects.push(DeckEffect::FetchConductor { repo });
    }
    effects
}

fn graph_requests(state: &mut DeckState) -> Vec<DeckEffect> {
    state
        .graph
        .drain_requests()
        .into_iter()
        .map(|fetch| match fetch {
            GraphFetch::CommitDetail { repo, hash } => DeckEffect::FetchCommitDetail { repo, hash },
            GraphFetch::FileDiff { repo, hash, path } => {
                DeckEffect::FetchCommitFileDiff { repo, hash, path }
            }
        })
        .collect()
}

fn reduce_runtime(state: &mut DeckState, action: RuntimeAction) -> Vec<DeckEffect> {
    debug!(action = action.name(), "runtime action");
    match action {
        RuntimeAction::Tick { now } => {
            let first = state.now.is_none();
            state.now = Some(now);
            if let Some(feedback) = &mut state.feedback {
                if feedback.posted.is_none() {
                    feedback.posted = Some(now);
                } else if feedback.is_expired(now) {
                    state.feedback = None;
                }
            }
            if !first
                && !matches!(
                    state.active_view(),
                    ActiveView::Dashboard | ActiveView::BranchPicker
                )
            {
                return Vec::new();
            }
            let mut effects = vec![fetch_status(state)];
            let wants_conductor = state.router.show_graph() || state.router.show_conductor();
            if let Some(repo) = selected_repo_path(state).filter(|_| wants_conductor) {
                effects.push(DeckEffect::FetchConductor { repo });
            }
            effects
        }
        RuntimeAction::StatusRefreshed { seq, projects } => {
            if seq <= state.status_applied {
                debug!(seq, applied = state.status_applied, "dropping stale status");
                return Vec::new();
            }
            state.status_applied = seq;
            state.dashboard.set_projects(projects);
            maybe_refresh_graph(state)
        }
        RuntimeAction::GraphFetched { repo, result } => {
            if state.graph_repo.as_ref() != Some(&repo) {
                debug!(repo = %repo.display(), "dropping stale graph");
                return Vec::new();
            }
            match result {
                Ok(lines) => {
                    state.graph.set_graph(repo.clone(), lines);
                    let linked = state.conductor_cache.get(&repo);
                    state.graph.set_linked_features(linked);
                }
                Err(err) => {
                    warn!(repo = %repo.display(), %err, "graph fetch failed");
                    state.graph.clear();
                }
            }
            let sections = state.sections();
            state.router.enforce(sections);
            graph_requests(state)
        }
        RuntimeAction::CommitDetailFetched { repo, hash, result } => {
            if state.graph.repo() != Some(repo.as_path()) {
                return Vec::new();
            }
            match result {
                Ok(detail) => {
                    state.graph.set_commit_detail(&hash, detail);
                }
                Err(err) => {
                    warn!(%hash, %err, "commit detail fetch failed");
                    state.graph.set_commit_detail_error(&hash, &err);
                }
            }
            let sections = state.sections();
            state.router.enforce(sections);
            Vec::new()
        }
        RuntimeAction::CommitFileDiffFetched {
            repo,
            hash,
            path,
            result,
        } => {
            if state.graph.repo() != Some(repo.as_path()) {
                return Vec::new();
            }
            let diff = result.unwrap_or_else(|err| {
                warn!(%hash, %path, %err, "commit file diff fetch failed");
                format!("error: {err}")
            });
            state.graph.set_file_diff(&hash, &path, &diff);
            Vec::new()
        }
        RuntimeAction::FileDiffFetched { repo, file, result } => {
            match result {
                Err(err) => state.set_feedback(FeedbackLevel::Error, format!("Error: {err}")),
                Ok(diff) => {
                    if !matches!(state.screen, Screen::Dashboard) {
                        debug!(path = %file.path, "diff arrived outside the dashboard");
                        return Vec::new();
                    }
                    let mut view = DiffView::new(&state.theme, repo, file, &diff);
                    view.set_size(state.size.0, state.size.1);
                    state.screen = Screen::Diff(view);
                }
            }
            Vec::new()
        }
        RuntimeAction::StagingDone { repo, result } => {
            if let Err(err) = result {
                warn!(repo = %repo.display(), %err, "staging failed");
                state.set_feedback(FeedbackLevel::Error, format!("Error: {err}"));
            }
            vec![fetch_status(state)]
        }
        RuntimeAction::CommitDone {
            repo,
            message,
            result,
        } => match result {
            Err(err) => {
                warn!(repo = %repo.display(), %err, "commit failed");
                match &mut state.screen {
                    Screen::Commit(view) => view.set_error(err),
                    _ => state.set_feedback(FeedbackLevel::Error, format!("Commit failed: {err}")),
                }
                Vec::new()
            }
            Ok(hash) => {
                info!(repo = %repo.display(), %hash, "committed");
                state.screen = Screen::Dashboard;
                state.set_feedback(FeedbackLevel::Success, "Committed successfully");
                state.graph_repo = None;
                let linker = state
                    .conductor_cache
                    .get(&repo)
                    .and_then(|data| FeatureLinker::open(repo.clone(), hash, message, data));
                if let Some(linker) = linker {
                    state.overlays.push(Overlay::FeatureLinker(linker));
                }
                vec![fetch_status(state)]
            }
        },
        RuntimeAction::BranchesFetched { repo, result } => {
            match result {
                Err(err) => state.set_feedback(FeedbackLevel::Error, format!("Error: {err}")),
                Ok(branches) => {
                    if state.active_view() != ActiveView::Dashboard {
                        debug!("branch list arrived outside the dashboard");
                        return Vec::new();
                    }
                    state
                        .overlays
                        .push(Overlay::BranchPicker(BranchPicker::new(repo, branches)));
                }
            }
            Vec::new()
        }
        RuntimeAction::BranchSwitched {
            repo,
            branch,
            result,
        } => {
            branch_changed(state, &repo, result, format!("Switched to {branch}"));
            vec![fetch_status(state)]
        }
        RuntimeAction::BranchCreated {
            repo,
            branch,
            result,
        } => {
            branch_changed(state, &repo, result, format!("Created {branch}"));
            vec![fetch_status(state)]
        }
        RuntimeAction::ConductorFetched { repo, result } => {
            match result {
                Ok(Some(data)) => {
                    state.conductor_cache.insert(repo.clone(), data);
                }
                Ok(None) => {
                    state.conductor_cache.remove(&repo);
                }
                Err(err) => {
                    warn!(repo = %repo.display(), %err, "conductor fetch failed");
                    state.conductor_cache.remove(&repo);
                }
            }
            if state.conductor_repo.as_ref() == Some(&repo) {
                let data = state.conductor_cache.get(&repo).cloned();
                state.graph.set_linked_features(data.as_ref());
                state.conductor.set_data(data);
                let sections = state.sections();
                state.router.enforce(sections);
            }
            Vec::new()
        }
        RuntimeAction::FeatureLinked {
            repo,
            feature_id,
            result,
        } => match result {
            Ok(()) => {
                state.set_feedback(FeedbackLevel::Success, format!("Linked to: {feature_id}"));
                vec![DeckEffect::FetchConductor { repo }]
            }
            Err(err) => {
                warn!(%feature_id, %err, "feature link failed");
                state.set_feedback(FeedbackLevel::Error, format!("Link failed: {err}"));
                Vec::new()
            }
        },
        RuntimeAction::ProjectsSaved { result } => {
            match result {
                Ok(()) => state.set_feedback(FeedbackLevel::Success, "Projects saved"),
                Err(err) => {
                    warn!(%err, "saving projects failed");
                    state.set_feedback(FeedbackLevel::Error, format!("Saving projects failed: {err}"));
                }
            }
            Vec::new()
        }
    }
}

fn branch_changed(state: &mut DeckState, repo: &std::path::Path, result: Result<(), String>, success: String) {
    match result {
        Ok(()) => {
            info!(repo = %repo.display(), "{success}");
            state.set_feedback(FeedbackLevel::Success, success);
        }
        Err(err) => {
            warn!(repo = %repo.display(), %err, "branch change failed");
            state.set_feedback(FeedbackLevel::Error, format!("Error: {err}"));
        }
    }
    state.graph_repo = None;
}

#[cfg(test)]
mod tests;
