use std::path::PathBuf;
use std::time::Instant;

use crate::keys::Key;
use crate::source::BranchInfo;
use crate::source::CommitDetail;
use crate::source::ConductorData;
use crate::source::FileEntry;
use crate::source::GraphLine;
use crate::source::ProjectStatus;

#[derive(Debug, Clone)]
pub enum DeckAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    Key(Key),
    Resize { width: usize, height: usize },
}

/// Completions posted back by the workers. Failures arrive as the error's
/// display text.
#[derive(Debug, Clone)]
pub enum RuntimeAction {
    /// Poll timer. The first tick also performs the initial load.
    Tick {
        now: Instant,
    },
    /// Answers the `FetchStatus` request numbered `seq`.
    StatusRefreshed {
        seq: u64,
        projects: Vec<ProjectStatus>,
    },
    GraphFetched {
        repo: PathBuf,
        result: Result<Vec<GraphLine>, String>,
    },
    CommitDetailFetched {
        repo: PathBuf,
        hash: String,
        result: Result<CommitDetail, String>,
    },
    CommitFileDiffFetched {
        repo: PathBuf,
        hash: String,
        path: String,
        result: Result<String, String>,
    },
    FileDiffFetched {
        repo: PathBuf,
        file: FileEntry,
        result: Result<String, String>,
    },
    StagingDone {
        repo: PathBuf,
        result: Result<(), String>,
    },
    /// `Ok` carries the new commit's hash.
    CommitDone {
        repo: PathBuf,
        message: String,
        result: Result<String, String>,
    },
    BranchesFetched {
        repo: PathBuf,
        result: Result<Vec<BranchInfo>, String>,
    },
    BranchSwitched {
        repo: PathBuf,
        branch: String,
        result: Result<(), String>,
    },
    BranchCreated {
        repo: PathBuf,
        branch: String,
        result: Result<(), String>,
    },
    /// `Ok(None)` when the repository has no conductor snapshot.
    ConductorFetched {
        repo: PathBuf,
        result: Result<Option<ConductorData>, String>,
    },
    FeatureLinked {
        repo: PathBuf,
        feature_id: String,
        result: Result<(), String>,
    },
    ProjectsSaved {
        result: Result<(), String>,
    },
}

impl RuntimeAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::StatusRefreshed { .. } => "status_refreshed",
            Self::GraphFetched { .. } => "graph_fetched",
            Self::CommitDetailFetched { .. } => "commit_detail_fetched",
            Self::CommitFileDiffFetched { .. } => "commit_file_diff_fetched",
            Self::FileDiffFetched { .. } => "file_diff_fetched",
            Self::StagingDone { .. } => "staging_done",
            Self::CommitDone { .. } => "commit_done",
            Self::BranchesFetched { .. } => "branches_fetched",
            Self::BranchSwitched { .. } => "branch_switched",
            Self::BranchCreated { .. } => "branch_created",
            Self::ConductorFetched { .. } => "conductor_fetched",
            Self::FeatureLinked { .. } => "feature_linked",
            Self::ProjectsSaved { .. } => "projects_saved",
        }
    }
}
