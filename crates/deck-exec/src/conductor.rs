//! Conductor snapshots: feature progress, session, handoff and notes kept
//! alongside a repository.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use deck_core::source::ConductorData;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const SNAPSHOT_DIR: &str = ".conductor";
pub const SNAPSHOT_FILE: &str = "snapshot.json";

#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no conductor snapshot in {0}")]
    Missing(PathBuf),
    #[error("unknown feature {0}")]
    UnknownFeature(String),
}

pub trait ConductorSource {
    /// `Ok(None)` when the repository has no conductor data.
    fn load(&self, repo: &Path) -> Result<Option<ConductorData>, ConductorError>;

    /// Records `hash` as the commit that delivered `feature_id`.
    fn link_commit(
        &self,
        repo: &Path,
        feature_id: &str,
        hash: &str,
        message: &str,
    ) -> Result<(), ConductorError>;
}

/// A commit linked to a feature, kept next to the snapshot data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub feature_id: String,
    pub hash: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(flatten)]
    data: ConductorData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    commits: Vec<CommitRecord>,
}

/// Reads `<repo>/.conductor/snapshot.json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSnapshotSource;

impl JsonSnapshotSource {
    pub fn snapshot_path(repo: &Path) -> PathBuf {
        repo.join(SNAPSHOT_DIR).join(SNAPSHOT_FILE)
    }

    fn read(path: &Path) -> Result<Option<Snapshot>, ConductorError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConductorError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ConductorError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn commits(&self, repo: &Path) -> Result<Vec<CommitRecord>, ConductorError> {
        Ok(Self::read(&Self::snapshot_path(repo))?
            .map(|snapshot| snapshot.commits)
            .unwrap_or_default())
    }
}

impl ConductorSource for JsonSnapshotSource {
    fn load(&self, repo: &Path) -> Result<Option<ConductorData>, ConductorError> {
        let path = Self::snapshot_path(repo);
        let snapshot = Self::read(&path)?;
        if snapshot.is_none() {
            debug!(path = %path.display(), "no conductor snapshot");
        }
        Ok(snapshot.map(|snapshot| snapshot.data))
    }

    fn link_commit(
        &self,
        repo: &Path,
        feature_id: &str,
        hash: &str,
        message: &str,
    ) -> Result<(), ConductorError> {
        let path = Self::snapshot_path(repo);
        let mut snapshot =
            Self::read(&path)?.ok_or_else(|| ConductorError::Missing(repo.to_path_buf()))?;
        let feature = snapshot
            .data
            .features
            .iter_mut()
            .find(|feature| feature.id == feature_id)
            .ok_or_else(|| ConductorError::UnknownFeature(feature_id.to_string()))?;
        feature.commit_hash = Some(hash.to_string());
        snapshot.commits.push(CommitRecord {
            feature_id: feature_id.to_string(),
            hash: hash.to_string(),
            message: message.to_string(),
        });

        let write_err = |source| ConductorError::Write {
            path: path.clone(),
            source,
        };
        let text = serde_json::to_string_pretty(&snapshot).map_err(|source| {
            ConductorError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, text).map_err(write_err)?;
        fs::rename(&staging, &path).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use deck_core::source::FeatureStatus;
    use pretty_assertions::assert_eq;

    use super::*;

    const SNAPSHOT: &str = r#"{
        "features": [
            {"id": "F-1", "category": "auth", "description": "Login", "status": "passed", "phase": 1, "commit_hash": "abc1234"},
            {"id": "F-2", "description": "Logout", "status": "in_progress"}
        ],
        "session": {"id": "s-9", "number": 9, "status": "active"},
        "handoff": {"current_task": "logout", "next_steps": ["wire button"]},
        "quality": [{"reflection_type": "end", "shortcuts_taken": ["no retries"]}],
        "memories": [{"name": "db", "content": "sqlite", "tags": ["infra"]}]
    }"#;

    fn repo_with_snapshot(text: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join(SNAPSHOT_DIR)).expect("mkdir");
        fs::write(JsonSnapshotSource::snapshot_path(dir.path()), text).expect("write snapshot");
        dir
    }

    #[test]
    fn missing_snapshot_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(JsonSnapshotSource.load(dir.path()).expect("load"), None);
    }

    #[test]
    fn loads_every_section_with_defaults_for_absent_fields() {
        let dir = repo_with_snapshot(SNAPSHOT);
        let data = JsonSnapshotSource
            .load(dir.path())
            .expect("load")
            .expect("snapshot");
        assert_eq!(data.total(), 2);
        assert_eq!(data.passed(), 1);
        assert_eq!(data.features[1].status, FeatureStatus::InProgress);
        assert_eq!(data.features[1].category, "");
        assert_eq!(data.session.as_ref().map(|s| s.number), Some(9));
        assert_eq!(
            data.handoff.as_ref().map(|h| h.next_steps.clone()),
            Some(vec!["wire button".to_string()])
        );
        assert_eq!(data.quality[0].shortcuts_taken, vec!["no retries".to_string()]);
        assert_eq!(data.memories[0].tags, vec!["infra".to_string()]);
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let dir = repo_with_snapshot("{ not json");
        let err = JsonSnapshotSource.load(dir.path()).expect_err("parse error");
        assert!(matches!(err, ConductorError::Parse { .. }));
        assert!(err.to_string().contains("snapshot.json"));
    }

    #[test]
    fn linking_records_the_hash_on_the_feature() {
        let dir = repo_with_snapshot(SNAPSHOT);
        JsonSnapshotSource
            .link_commit(dir.path(), "F-2", "def5678", "feat: logout")
            .expect("link");

        let data = JsonSnapshotSource
            .load(dir.path())
            .expect("load")
            .expect("snapshot");
        assert_eq!(data.features[1].commit_hash.as_deref(), Some("def5678"));
        assert_eq!(data.feature_for_commit("def5678abc").map(|f| f.id.as_str()), Some("F-2"));
        assert_eq!(
            JsonSnapshotSource.commits(dir.path()).expect("commits"),
            vec![CommitRecord {
                feature_id: "F-2".to_string(),
                hash: "def5678".to_string(),
                message: "feat: logout".to_string(),
            }]
        );
    }

    #[test]
    fn linking_an_unknown_feature_fails_without_writing() {
        let dir = repo_with_snapshot(SNAPSHOT);
        let err = JsonSnapshotSource
            .link_commit(dir.path(), "F-404", "def5678", "")
            .expect_err("unknown feature");
        assert_eq!(err.to_string(), "unknown feature F-404");
        let text = fs::read_to_string(JsonSnapshotSource::snapshot_path(dir.path()))
            .expect("read snapshot");
        assert_eq!(text, SNAPSHOT);
    }

    #[test]
    fn linking_without_a_snapshot_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = JsonSnapshotSource
            .link_commit(dir.path(), "F-1", "abc", "")
            .expect_err("missing");
        assert!(matches!(err, ConductorError::Missing(_)));
    }
}
