//! Runs core effects off the UI thread and posts their results back.

use std::path::Path;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use deck_core::config;
use deck_core::config::Config;
use deck_core::config::ProjectConfig;
use deck_core::DeckEffect;
use deck_core::RuntimeAction;
use deck_exec::git;
use deck_exec::ConductorSource;
use deck_exec::JsonSnapshotSource;
use tracing::debug;
use tracing::warn;

pub struct Worker {
    tx: Sender<RuntimeAction>,
    context: Arc<WorkerContext>,
}

pub struct WorkerContext {
    pub config_path: PathBuf,
    /// Loaded config; saving replaces only its project list.
    pub config: Config,
    pub conductor: Box<dyn ConductorSource + Send + Sync>,
}

impl Worker {
    pub fn new(tx: Sender<RuntimeAction>, config_path: PathBuf, config: Config) -> Self {
        Self {
            tx,
            context: Arc::new(WorkerContext {
                config_path,
                config,
                conductor: Box::new(JsonSnapshotSource),
            }),
        }
    }

    /// Starts `effect` on its own thread. Returns false for [`DeckEffect::Quit`].
    pub fn dispatch(&self, effect: DeckEffect) -> bool {
        if effect == DeckEffect::Quit {
            return false;
        }
        let tx = self.tx.clone();
        let context = Arc::clone(&self.context);
        thread::spawn(move || {
            if let Some(action) = execute(effect, &context) {
                if tx.send(action).is_err() {
                    debug!("ui gone, dropping worker result");
                }
            }
        });
        true
    }
}

fn text<T, E: ToString>(result: Result<T, E>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}

/// Performs one effect and returns the action that reports it.
pub fn execute(effect: DeckEffect, context: &WorkerContext) -> Option<RuntimeAction> {
    let action = match effect {
        DeckEffect::Quit => return None,
        DeckEffect::FetchStatus { seq, projects } => RuntimeAction::StatusRefreshed {
            seq,
            projects: git::project_statuses(&projects),
        },
        DeckEffect::FetchGraph { repo, max_commits } => RuntimeAction::GraphFetched {
            result: text(git::graph(&repo, max_commits)),
            repo,
        },
        DeckEffect::FetchCommitDetail { repo, hash } => RuntimeAction::CommitDetailFetched {
            result: text(git::commit_detail(&repo, &hash)),
            repo,
            hash,
        },
        DeckEffect::FetchCommitFileDiff { repo, hash, path } => {
            RuntimeAction::CommitFileDiffFetched {
                result: text(git::commit_file_diff(&repo, &hash, &path)),
                repo,
                hash,
                path,
            }
        }
        DeckEffect::FetchFileDiff { repo, file } => RuntimeAction::FileDiffFetched {
            result: text(git::file_diff(&repo, &file)),
            repo,
            file,
        },
        DeckEffect::Stage { repo, path } => RuntimeAction::StagingDone {
            result: text(git::stage(&repo, &path)),
            repo,
        },
        DeckEffect::Unstage { repo, path } => RuntimeAction::StagingDone {
            result: text(git::unstage(&repo, &path)),
            repo,
        },
        DeckEffect::StageAll { repo } => RuntimeAction::StagingDone {
            result: text(git::stage_all(&repo)),
            repo,
        },
        DeckEffect::UnstageAll { repo } => RuntimeAction::StagingDone {
            result: text(git::unstage_all(&repo)),
            repo,
        },
        DeckEffect::Commit { repo, message } => RuntimeAction::CommitDone {
            result: text(git::commit(&repo, &message)),
            repo,
            message,
        },
        DeckEffect::FetchBranches { repo } => RuntimeAction::BranchesFetched {
            result: text(git::list_branches(&repo)),
            repo,
        },
        DeckEffect::SwitchBranch { repo, branch } => RuntimeAction::BranchSwitched {
            result: text(git::switch_branch(&repo, &branch)),
            repo,
            branch,
        },
        DeckEffect::CreateBranch { repo, branch } => RuntimeAction::BranchCreated {
            result: text(git::create_branch(&repo, &branch)),
            repo,
            branch,
        },
        DeckEffect::FetchConductor { repo } => RuntimeAction::ConductorFetched {
            result: text(context.conductor.load(&repo)),
            repo,
        },
        DeckEffect::LinkFeature {
            repo,
            feature_id,
            hash,
            message,
        } => RuntimeAction::FeatureLinked {
            result: text(
                context
                    .conductor
                    .link_commit(&repo, &feature_id, &hash, &message),
            ),
            repo,
            feature_id,
        },
        DeckEffect::SaveProjects { projects } => RuntimeAction::ProjectsSaved {
            result: text(save_projects(&context.config_path, &context.config, projects)),
        },
    };
    if let Some(err) = failure(&action) {
        warn!(action = action.name(), %err, "effect failed");
    }
    Some(action)
}

fn failure(action: &RuntimeAction) -> Option<&str> {
    let err = match action {
        RuntimeAction::GraphFetched { result, .. } => result.as_ref().err(),
        RuntimeAction::CommitDetailFetched { result, .. } => result.as_ref().err(),
        RuntimeAction::StagingDone { result, .. } => result.as_ref().err(),
        RuntimeAction::CommitDone { result, .. } => result.as_ref().err(),
        RuntimeAction::ConductorFetched { result, .. } => result.as_ref().err(),
        RuntimeAction::ProjectsSaved { result } => result.as_ref().err(),
        _ => None,
    };
    err.map(String::as_str)
}

/// Writes the edited projects. Legacy top-level repos were folded into the
/// project list when loading, so they are dropped from the saved file.
fn save_projects(
    path: &Path,
    base: &Config,
    projects: Vec<ProjectConfig>,
) -> Result<(), config::ConfigError> {
    let mut out = base.clone();
    out.projects = projects;
    out.repos.clear();
    config::save(path, &out)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::process::Command;
    use std::process::Stdio;
    use std::sync::mpsc;
    use std::time::Duration;

    use deck_core::config::RepoConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    fn context(dir: &Path) -> WorkerContext {
        WorkerContext {
            config_path: dir.join("config.toml"),
            config: Config::default(),
            conductor: Box::new(JsonSnapshotSource),
        }
    }

    fn git_ok(cwd: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(cwd)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .expect("git command should execute");
        assert!(status.success(), "git {args:?} failed with {status}");
    }

    #[test]
    fn failures_come_back_as_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let action = execute(
            DeckEffect::FetchBranches {
                repo: dir.path().to_path_buf(),
            },
            &context(dir.path()),
        );
        match action {
            Some(RuntimeAction::BranchesFetched { repo, result }) => {
                assert_eq!(repo, dir.path());
                assert!(result.expect_err("not a repo").starts_with("git branch"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quit_has_no_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(execute(DeckEffect::Quit, &context(dir.path())).is_none());
    }

    #[test]
    fn staging_and_status_round_through_git() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = dir.path().join("api");
        fs::create_dir_all(&repo).expect("mkdir");
        git_ok(&repo, &["init", "-q"]);
        fs::write(repo.join("a.txt"), "a\n").expect("write");
        let context = context(dir.path());

        let action = execute(
            DeckEffect::Stage {
                repo: repo.clone(),
                path: "a.txt".to_string(),
            },
            &context,
        );
        assert!(matches!(
            action,
            Some(RuntimeAction::StagingDone { result: Ok(()), .. })
        ));

        let projects = vec![ProjectConfig {
            name: "work".to_string(),
            path: None,
            repos: vec![RepoConfig {
                path: repo.clone(),
                ignore_patterns: Vec::new(),
            }],
        }];
        let Some(RuntimeAction::StatusRefreshed { seq, projects: statuses }) =
            execute(DeckEffect::FetchStatus { seq: 7, projects }, &context)
        else {
            panic!("expected statuses");
        };
        assert_eq!(seq, 7);
        assert_eq!(statuses[0].repos[0].name, "api");
        assert_eq!(statuses[0].repos[0].staged_count(), 1);
    }

    #[test]
    fn saving_projects_drops_legacy_repos() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = dir.path().join("api");
        fs::create_dir_all(&repo).expect("mkdir");
        let mut context = context(dir.path());
        context.config.repos = vec![RepoConfig {
            path: repo.clone(),
            ignore_patterns: Vec::new(),
        }];

        let projects = vec![ProjectConfig {
            name: "deck".to_string(),
            path: None,
            repos: vec![RepoConfig {
                path: repo,
                ignore_patterns: Vec::new(),
            }],
        }];
        let action = execute(DeckEffect::SaveProjects { projects }, &context);
        assert!(matches!(
            action,
            Some(RuntimeAction::ProjectsSaved { result: Ok(()) })
        ));

        let saved = config::load(&context.config_path).expect("reload");
        assert!(saved.repos.is_empty());
        assert_eq!(saved.projects.len(), 1);
        assert_eq!(saved.projects[0].repos[0].path, dir.path().join("api"));
    }

    #[test]
    fn dispatch_posts_results_to_the_channel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = mpsc::channel();
        let worker = Worker::new(tx, dir.path().join("config.toml"), Config::default());

        assert!(!worker.dispatch(DeckEffect::Quit));
        assert!(worker.dispatch(DeckEffect::FetchConductor {
            repo: dir.path().to_path_buf(),
        }));
        let action = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker result");
        match action {
            RuntimeAction::ConductorFetched { result, .. } => assert_eq!(result, Ok(None)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
