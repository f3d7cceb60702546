//! Plain data snapshots delivered by the collaborator layer.
//!
//! Nothing here holds a live handle: every record is a value copied out of a
//! `git` invocation or a conductor snapshot file.

use std::path::PathBuf;

use chrono::DateTime;
use chrono::FixedOffset;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Untracked,
}

impl FileStatus {
    pub fn from_code(code: char) -> Self {
        match code {
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            '?' => Self::Untracked,
            _ => Self::Modified,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Modified => 'M',
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Untracked => '?',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Untracked => "untracked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staging {
    Staged,
    Unstaged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub status: FileStatus,
    pub staging: Staging,
    /// Source path of a rename or copy.
    pub orig_path: Option<String>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, status: FileStatus, staging: Staging) -> Self {
        Self {
            path: path.into(),
            status,
            staging,
            orig_path: None,
        }
    }

    /// Parent directory, `"."` for files at the repository root.
    pub fn dir(&self) -> &str {
        parent_dir(&self.path)
    }
}

pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepoStatus {
    pub path: PathBuf,
    pub name: String,
    pub branch: String,
    pub files: Vec<FileEntry>,
    pub ahead: usize,
    pub behind: usize,
    /// Set when the status query failed; the repo then shows no children.
    pub error: Option<String>,
}

impl RepoStatus {
    pub fn staged_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| file.staging == Staging::Staged)
            .count()
    }

    pub fn unstaged_count(&self) -> usize {
        self.files.len() - self.staged_count()
    }

    pub fn has_staged(&self) -> bool {
        self.staged_count() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectStatus {
    pub name: String,
    pub path: Option<PathBuf>,
    pub repos: Vec<RepoStatus>,
}

impl ProjectStatus {
    pub fn change_count(&self) -> usize {
        self.repos.iter().map(|repo| repo.files.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.repos.iter().any(|repo| repo.error.is_some())
    }
}

/// One row of `git log --graph`: either a commit or a connector-only line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphLine {
    pub graph_chars: String,
    pub hash: String,
    pub refs: String,
    pub message: String,
    pub is_commit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitFileStat {
    pub path: String,
    pub added: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitDetail {
    pub hash: String,
    pub author: String,
    /// ISO-ish date as printed by `git show --format=%ai`.
    pub date: String,
    pub message: String,
    pub files: Vec<CommitFileStat>,
    pub total_add: usize,
    pub total_del: usize,
}

impl CommitDetail {
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(self.date.trim(), "%Y-%m-%d %H:%M:%S %z").ok()
    }

    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }

    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
    pub upstream: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    Pending,
    InProgress,
    Passed,
    Failed,
    Blocked,
}

impl FeatureStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        }
    }

    /// Features a new commit can still be linked to.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub status: FeatureStatus,
    #[serde(default)]
    pub phase: u32,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default)]
    pub commit_hash: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub id: String,
    pub number: u32,
    pub status: String,
    pub progress_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Handoff {
    pub current_task: String,
    pub next_steps: Vec<String>,
    pub blockers: Vec<String>,
    pub files_modified: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityReflection {
    pub reflection_type: String,
    pub shortcuts_taken: Vec<String>,
    pub tests_skipped: Vec<String>,
    pub known_limitations: Vec<String>,
    pub deferred_work: Vec<String>,
    pub technical_debt: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Memory {
    pub name: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorData {
    pub features: Vec<Feature>,
    pub session: Option<Session>,
    pub handoff: Option<Handoff>,
    pub quality: Vec<QualityReflection>,
    pub memories: Vec<Memory>,
}

impl ConductorData {
    pub fn passed(&self) -> usize {
        self.features
            .iter()
            .filter(|feature| feature.status == FeatureStatus::Passed)
            .count()
    }

    pub fn total(&self) -> usize {
        self.features.len()
    }

    /// Feature whose recorded commit hash starts with (or is a prefix of)
    /// `hash`.
    pub fn feature_for_commit(&self, hash: &str) -> Option<&Feature> {
        if hash.is_empty() {
            return None;
        }
        self.features.iter().find(|feature| {
            feature
                .commit_hash
                .as_deref()
                .filter(|linked| !linked.is_empty())
                .is_some_and(|linked| linked.starts_with(hash) || hash.starts_with(linked))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dir_and_base_name_split_on_last_slash() {
        assert_eq!(parent_dir("src/ui/app.rs"), "src/ui");
        assert_eq!(parent_dir("README.md"), ".");
        assert_eq!(base_name("src/ui/app.rs"), "app.rs");
        assert_eq!(base_name("README.md"), "README.md");
    }

    #[test]
    fn commit_date_parses_git_iso_format() {
        let detail = CommitDetail {
            hash: "0123456789abcdef".to_string(),
            date: "2024-03-05 14:22:01 +0100".to_string(),
            ..CommitDetail::default()
        };
        let parsed = detail.parsed_date().expect("date");
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-03-05");
        assert_eq!(detail.short_hash(), "0123456");
    }

    #[test]
    fn linked_feature_matches_either_prefix_direction() {
        let data = ConductorData {
            features: vec![Feature {
                id: "F-1".to_string(),
                category: "core".to_string(),
                description: "Login".to_string(),
                status: FeatureStatus::Passed,
                phase: 1,
                attempt_count: 1,
                commit_hash: Some("abc1234".to_string()),
                last_error: None,
            }],
            ..ConductorData::default()
        };
        assert_eq!(data.feature_for_commit("abc1234ff").map(|f| f.id.as_str()), Some("F-1"));
        assert_eq!(data.feature_for_commit("abc").map(|f| f.id.as_str()), Some("F-1"));
        assert_eq!(data.feature_for_commit("fff"), None);
        assert_eq!(data.passed(), 1);
    }
}
