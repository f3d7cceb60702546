use std::path::PathBuf;
use std::time::Instant;

use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use super::DeckEffect;
pub(super) use crate::actions::DeckAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::Config;
pub(super) use crate::config::DisplayConfig;
pub(super) use crate::config::ProjectConfig;
pub(super) use crate::config::RepoConfig;
pub(super) use crate::conductor::ConductorSection;
pub(super) use crate::focus::ActiveView;
pub(super) use crate::focus::Panel;
pub(super) use crate::focus::PanelFocus;
pub(super) use crate::graph::GraphSection;
pub(super) use crate::keys::Key;
pub(super) use crate::overlay::Overlay;
pub(super) use crate::source::BranchInfo;
pub(super) use crate::source::CommitDetail;
pub(super) use crate::source::CommitFileStat;
pub(super) use crate::source::ConductorData;
pub(super) use crate::source::Feature;
pub(super) use crate::source::FeatureStatus;
pub(super) use crate::source::FileEntry;
pub(super) use crate::source::FileStatus;
pub(super) use crate::source::GraphLine;
pub(super) use crate::source::ProjectStatus;
pub(super) use crate::source::RepoStatus;
pub(super) use crate::source::Staging;
pub(super) use crate::state::DeckState;
pub(super) use crate::state::FeedbackLevel;
pub(super) use crate::state::Screen;

mod dashboard_keys;

const API: &str = "/work/api";
const WEB: &str = "/work/web";

fn api() -> PathBuf {
    PathBuf::from(API)
}

fn web() -> PathBuf {
    PathBuf::from(WEB)
}

fn config() -> Config {
    Config {
        projects: vec![ProjectConfig {
            name: "work".to_string(),
            path: None,
            repos: vec![
                RepoConfig {
                    path: api(),
                    ignore_patterns: Vec::new(),
                },
                RepoConfig {
                    path: web(),
                    ignore_patterns: Vec::new(),
                },
            ],
        }],
        display: DisplayConfig {
            show_graph: true,
            show_conductor: true,
            ..DisplayConfig::default()
        },
        ..Config::default()
    }
}

/// `api` has one staged and one unstaged file; `web` is clean.
fn statuses() -> Vec<ProjectStatus> {
    vec![ProjectStatus {
        name: "work".to_string(),
        path: None,
        repos: vec![
            RepoStatus {
                path: api(),
                name: "api".to_string(),
                branch: "main".to_string(),
                files: vec![
                    FileEntry::new("src/lib.rs", FileStatus::Modified, Staging::Staged),
                    FileEntry::new("README.md", FileStatus::Modified, Staging::Unstaged),
                ],
                ..RepoStatus::default()
            },
            RepoStatus {
                path: web(),
                name: "web".to_string(),
                branch: "dev".to_string(),
                ..RepoStatus::default()
            },
        ],
    }]
}

fn state() -> DeckState {
    let mut state = DeckState::new(&config());
    let effects = user(
        &mut state,
        UserAction::Resize {
            width: 120,
            height: 40,
        },
    );
    assert!(effects.is_empty());
    state
}

/// Statuses loaded, project entered and `api` expanded. Rows:
/// api, [staged], src/lib.rs, [unstaged], README.md, web.
fn ready() -> DeckState {
    let mut state = state();
    load_statuses(&mut state);
    press(&mut state, Key::Enter);
    press(&mut state, Key::Enter);
    state
}

fn user(state: &mut DeckState, action: UserAction) -> Vec<DeckEffect> {
    reduce(state, DeckAction::User(action))
}

fn press(state: &mut DeckState, key: Key) -> Vec<DeckEffect> {
    user(state, UserAction::Key(key))
}

fn type_text(state: &mut DeckState, text: &str) {
    for c in text.chars() {
        press(state, Key::Char(c));
    }
}

fn run(state: &mut DeckState, action: RuntimeAction) -> Vec<DeckEffect> {
    reduce(state, DeckAction::Runtime(action))
}

fn run_quiet(state: &mut DeckState, action: RuntimeAction) {
    let effects = run(state, action);
    assert!(effects.is_empty(), "unexpected effects: {effects:?}");
}

fn fetch_status(seq: u64) -> DeckEffect {
    DeckEffect::FetchStatus {
        seq,
        projects: config().projects,
    }
}

fn status_refreshed(seq: u64, projects: Vec<ProjectStatus>) -> RuntimeAction {
    RuntimeAction::StatusRefreshed { seq, projects }
}

/// Delivers [`statuses`] as the answer to the startup poll.
fn load_statuses(state: &mut DeckState) -> Vec<DeckEffect> {
    state.status_requested += 1;
    let seq = state.status_requested;
    run(state, status_refreshed(seq, statuses()))
}

fn commit_line(hash: &str, message: &str) -> GraphLine {
    GraphLine {
        graph_chars: "* ".to_string(),
        hash: hash.to_string(),
        refs: String::new(),
        message: message.to_string(),
        is_commit: true,
    }
}

fn graph_lines() -> Vec<GraphLine> {
    vec![
        commit_line("c1", "feat: one"),
        commit_line("c2", "fix: two"),
        commit_line("c3", "chore: three"),
    ]
}

fn detail(hash: &str) -> CommitDetail {
    CommitDetail {
        hash: hash.to_string(),
        author: "dev".to_string(),
        date: "2024-03-05 14:22:01 +0100".to_string(),
        message: format!("message {hash}"),
        files: vec![CommitFileStat {
            path: "src/lib.rs".to_string(),
            added: 2,
            deleted: 1,
        }],
        total_add: 2,
        total_del: 1,
    }
}

fn feature(id: &str, status: FeatureStatus) -> Feature {
    Feature {
        id: id.to_string(),
        category: "core".to_string(),
        description: format!("feature {id}"),
        status,
        phase: 1,
        attempt_count: 0,
        commit_hash: None,
        last_error: None,
    }
}

fn conductor_data() -> ConductorData {
    ConductorData {
        features: vec![
            feature("F-1", FeatureStatus::Passed),
            feature("F-2", FeatureStatus::InProgress),
        ],
        ..ConductorData::default()
    }
}

/// `ready()` plus the api graph and conductor snapshot delivered.
fn with_graph() -> DeckState {
    let mut state = ready();
    run(
        &mut state,
        RuntimeAction::GraphFetched {
            repo: api(),
            result: Ok(graph_lines()),
        },
    );
    run_quiet(
        &mut state,
        RuntimeAction::ConductorFetched {
            repo: api(),
            result: Ok(Some(conductor_data())),
        },
    );
    state
}

fn feedback(state: &DeckState) -> Option<(FeedbackLevel, String)> {
    state
        .feedback
        .as_ref()
        .map(|feedback| (feedback.level, feedback.message.clone()))
}

/// Focus always points at a visible panel.
fn assert_focus_visible(state: &DeckState) {
    let panel = state.router.focus().panel();
    assert!(
        state.router.layout().is_visible(panel),
        "focus {:?} on hidden panel, layout {:?}",
        state.router.focus(),
        state.router.layout()
    );
}

#[test]
fn fresh_state_starts_on_dashboard() {
    let state = state();
    assert_eq!(state.active_view(), ActiveView::Dashboard);
    assert_eq!(state.router.focus(), PanelFocus::Dashboard);
    assert_eq!(state.router.layout().dashboard, 30);
    assert_eq!(state.status_bar().text(), " deck │ ? for help");
}
