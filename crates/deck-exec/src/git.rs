//! `git` subprocesses and the parsers that turn their output into snapshot
//! records.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::thread;

use deck_core::config::ProjectConfig;
use deck_core::source::BranchInfo;
use deck_core::source::CommitDetail;
use deck_core::source::CommitFileStat;
use deck_core::source::FileEntry;
use deck_core::source::FileStatus;
use deck_core::source::GraphLine;
use deck_core::source::ProjectStatus;
use deck_core::source::RepoStatus;
use deck_core::source::Staging;
use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

const COMMIT_MARKER: &str = "COMMIT:";

#[derive(Debug, Error)]
pub enum GitError {
    #[error("running git in {cwd}: {source}")]
    Spawn {
        cwd: PathBuf,
        source: std::io::Error,
    },
    #[error("git {args}: {output}")]
    Failed { args: String, output: String },
    #[error("unexpected git {command} output")]
    Unexpected { command: &'static str },
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn output_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .trim_end()
        .to_string()
}

/// Runs `git` in `cwd`. Success yields stdout with trailing whitespace
/// removed; failure carries stderr (or stdout when stderr is empty).
pub fn run_git<I, S>(cwd: &Path, args: I) -> Result<String, GitError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let output = Command::new("git")
        .current_dir(cwd)
        .args(&args)
        .output()
        .map_err(|source| GitError::Spawn {
            cwd: cwd.to_path_buf(),
            source,
        })?;
    if output.status.success() {
        return Ok(output_text(&output));
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
    let joined = args
        .iter()
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    Err(GitError::Failed {
        args: joined,
        output: if stderr.is_empty() {
            output_text(&output)
        } else {
            stderr
        },
    })
}

/// Display name of a repository: its directory name.
pub fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Status of every configured repository, one thread per repository.
pub fn project_statuses(projects: &[ProjectConfig]) -> Vec<ProjectStatus> {
    thread::scope(|scope| {
        let handles: Vec<Vec<_>> = projects
            .iter()
            .map(|project| {
                project
                    .repos
                    .iter()
                    .map(|repo| {
                        scope.spawn(move || {
                            repo_status(&repo.path, &repo_name(&repo.path), &repo.ignore_patterns)
                        })
                    })
                    .collect()
            })
            .collect();

        projects
            .iter()
            .zip(handles)
            .map(|(project, handles)| ProjectStatus {
                name: project.name.clone(),
                path: project.path.clone(),
                repos: project
                    .repos
                    .iter()
                    .zip(handles)
                    .map(|(repo, handle)| {
                        handle.join().unwrap_or_else(|_| RepoStatus {
                            path: repo.path.clone(),
                            name: repo_name(&repo.path),
                            error: Some("status worker panicked".to_string()),
                            ..RepoStatus::default()
                        })
                    })
                    .collect(),
            })
            .collect()
    })
}

/// Branch, upstream distance and changed files. Failures land in
/// [`RepoStatus::error`] instead of being returned.
pub fn repo_status(path: &Path, name: &str, ignore_patterns: &[String]) -> RepoStatus {
    let mut status = RepoStatus {
        path: path.to_path_buf(),
        name: name.to_string(),
        ..RepoStatus::default()
    };
    // A repository without commits has no HEAD to resolve yet, only the
    // branch it points at.
    let branch = run_git(path, ["rev-parse", "--abbrev-ref", "HEAD"])
        .or_else(|err| run_git(path, ["symbolic-ref", "--short", "HEAD"]).map_err(|_| err));
    match branch {
        Ok(branch) => status.branch = branch,
        Err(err) => {
            debug!(repo = %path.display(), %err, "branch lookup failed");
            status.error = Some(err.to_string());
            return status;
        }
    }
    (status.ahead, status.behind) = ahead_behind(path);
    match run_git(path, ["status", "--porcelain", "-uall"]) {
        Ok(out) => status.files = parse_porcelain(&out, &IgnoreSet::new(ignore_patterns)),
        Err(err) => status.error = Some(err.to_string()),
    }
    status
}

/// Commits ahead of and behind the upstream. Without an upstream, commits
/// not on any remote count as ahead.
fn ahead_behind(path: &Path) -> (usize, usize) {
    if let Ok(out) = run_git(
        path,
        ["rev-list", "--count", "--left-right", "@{upstream}...HEAD"],
    ) {
        let counts: Vec<usize> = out
            .split_whitespace()
            .filter_map(|field| field.parse().ok())
            .collect();
        return match counts.as_slice() {
            [behind, ahead] => (*ahead, *behind),
            _ => (0, 0),
        };
    }
    run_git(path, ["rev-list", "--count", "HEAD", "--not", "--remotes"])
        .ok()
        .and_then(|out| out.trim().parse().ok())
        .map_or((0, 0), |ahead| (ahead, 0))
}

/// Glob patterns matched against a path or its file name. `*` and `?` stay
/// within one path segment.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    globs: GlobSet,
}

impl IgnoreSet {
    /// Patterns that fail to compile are logged and skipped.
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match GlobBuilder::new(pattern).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => warn!(pattern = %pattern, %err, "skipping invalid ignore pattern"),
            }
        }
        let globs = builder.build().unwrap_or_else(|err| {
            warn!(%err, "ignore patterns rejected, nothing will be ignored");
            GlobSet::empty()
        });
        Self { globs }
    }

    pub fn len(&self) -> usize {
        self.globs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap_or(path);
        self.globs.is_match(path) || self.globs.is_match(base)
    }
}

/// Parses `git status --porcelain`. A file changed in both the index and
/// the worktree yields two entries.
pub fn parse_porcelain(out: &str, ignore: &IgnoreSet) -> Vec<FileEntry> {
    let mut entries = Vec::new();
    for line in out.lines() {
        let mut chars = line.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };
        let Some(rest) = line.get(3..).filter(|rest| !rest.is_empty()) else {
            continue;
        };
        let (orig_path, path) = match rest.split_once(" -> ") {
            Some((from, to)) => (Some(from.to_string()), to.to_string()),
            None => (None, rest.to_string()),
        };
        if ignore.is_ignored(&path) {
            continue;
        }

        if index != ' ' && index != '?' {
            entries.push(FileEntry {
                path: path.clone(),
                status: FileStatus::from_code(index),
                staging: Staging::Staged,
                orig_path: orig_path.clone(),
            });
        }
        match worktree {
            ' ' => {}
            '?' => entries.push(FileEntry::new(
                path.clone(),
                FileStatus::Untracked,
                Staging::Unstaged,
            )),
            code => entries.push(FileEntry {
                path: path.clone(),
                status: FileStatus::from_code(code),
                staging: Staging::Unstaged,
                orig_path,
            }),
        }
    }
    entries
}

pub fn graph(repo: &Path, max_commits: usize) -> Result<Vec<GraphLine>, GitError> {
    let format = format!("--format={COMMIT_MARKER}%h|%d|%s");
    let count = format!("-n{max_commits}");
    let out = run_git(
        repo,
        [
            "log",
            "--graph",
            "--all",
            "--decorate=short",
            "--color=never",
            format.as_str(),
            count.as_str(),
        ],
    )?;
    Ok(out.lines().map(parse_graph_line).collect())
}

pub fn parse_graph_line(line: &str) -> GraphLine {
    let Some((graph_chars, rest)) = line.split_once(COMMIT_MARKER) else {
        return GraphLine {
            graph_chars: line.to_string(),
            ..GraphLine::default()
        };
    };
    let mut parts = rest.splitn(3, '|').map(str::trim);
    GraphLine {
        graph_chars: graph_chars.to_string(),
        hash: parts.next().unwrap_or_default().to_string(),
        refs: parts.next().unwrap_or_default().to_string(),
        message: parts.next().unwrap_or_default().to_string(),
        is_commit: true,
    }
}

pub fn commit_detail(repo: &Path, hash: &str) -> Result<CommitDetail, GitError> {
    let out = run_git(repo, ["show", "--stat", "--format=%H%n%an%n%ai%n%B", hash])?;
    parse_commit_detail(&out)
}

/// Parses `git show --stat --format=%H%n%an%n%ai%n%B`: three header lines,
/// the message, then the stat block ending in "N files changed".
pub fn parse_commit_detail(out: &str) -> Result<CommitDetail, GitError> {
    let lines: Vec<&str> = out.lines().collect();
    let [hash, author, date, ..] = lines.as_slice() else {
        return Err(GitError::Unexpected { command: "show" });
    };
    let mut detail = CommitDetail {
        hash: hash.to_string(),
        author: author.to_string(),
        date: date.to_string(),
        ..CommitDetail::default()
    };

    let summary = (3..lines.len()).rev().find(|&idx| {
        let line = lines[idx];
        line.contains("file changed") || line.contains("files changed")
    });
    let Some(summary) = summary else {
        detail.message = lines[3..].join("\n").trim().to_string();
        return Ok(detail);
    };

    let mut stat_start = summary;
    for idx in (3..summary).rev() {
        if lines[idx].trim().is_empty() {
            break;
        }
        if lines[idx].contains('|') {
            stat_start = idx;
        }
    }
    let mut message_end = stat_start;
    while message_end > 3 && lines[message_end - 1].trim().is_empty() {
        message_end -= 1;
    }
    detail.message = lines[3..message_end].join("\n").trim().to_string();

    for line in &lines[stat_start..summary] {
        if let Some(stat) = parse_stat_line(line) {
            detail.total_add += stat.added;
            detail.total_del += stat.deleted;
            detail.files.push(stat);
        }
    }
    Ok(detail)
}

/// One ` path | 5 ++---` line. Binary entries count no lines.
pub fn parse_stat_line(line: &str) -> Option<CommitFileStat> {
    let (path, stats) = line.split_once('|')?;
    let path = resolve_rename(path.trim());
    if path.is_empty() {
        return None;
    }
    let mut stat = CommitFileStat {
        path,
        ..CommitFileStat::default()
    };
    let mut fields = stats.split_whitespace();
    if let (Some(count), Some(bar)) = (fields.next(), fields.next()) {
        if count.parse::<usize>().is_ok() {
            stat.added = bar.chars().filter(|&c| c == '+').count();
            stat.deleted = bar.chars().filter(|&c| c == '-').count();
        }
    }
    Some(stat)
}

/// `src/{old => new}/f.rs` becomes `src/new/f.rs`; `a.rs => b.rs` becomes
/// `b.rs`.
fn resolve_rename(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.find('}')) {
        if close > open {
            if let Some((_, new)) = path[open + 1..close].split_once(" => ") {
                return format!("{}{}{}", &path[..open], new, &path[close + 1..]);
            }
        }
    }
    match path.split_once(" => ") {
        Some((_, new)) => new.trim().to_string(),
        None => path.to_string(),
    }
}

/// Diff of one file as changed by `hash`.
pub fn commit_file_diff(repo: &Path, hash: &str, path: &str) -> Result<String, GitError> {
    let out = run_git(repo, ["show", "--format=", hash, "--", path])?;
    Ok(match out.find("diff --git") {
        Some(start) if start > 0 => out[start..].to_string(),
        _ => out,
    })
}

/// Working-tree or index diff of a file. Untracked files have no diff, so
/// their content is shown as one all-added hunk.
pub fn file_diff(repo: &Path, file: &FileEntry) -> Result<String, GitError> {
    if file.status == FileStatus::Untracked {
        let full = repo.join(&file.path);
        let content = fs::read_to_string(&full).map_err(|source| GitError::Read {
            path: full.clone(),
            source,
        })?;
        return Ok(untracked_diff(&file.path, &content));
    }
    match file.staging {
        Staging::Staged => run_git(repo, ["diff", "--cached", "--", file.path.as_str()]),
        Staging::Unstaged => run_git(repo, ["diff", "--", file.path.as_str()]),
    }
}

pub fn untracked_diff(path: &str, content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut out = format!("--- /dev/null\n+++ b/{path}\n@@ -0,0 +1,{} @@\n", lines.len());
    for line in lines {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn stage(repo: &Path, path: &str) -> Result<(), GitError> {
    run_git(repo, ["add", "--", path]).map(drop)
}

pub fn unstage(repo: &Path, path: &str) -> Result<(), GitError> {
    run_git(repo, ["restore", "--staged", "--", path]).map(drop)
}

pub fn stage_all(repo: &Path) -> Result<(), GitError> {
    run_git(repo, ["add", "-A"]).map(drop)
}

pub fn unstage_all(repo: &Path) -> Result<(), GitError> {
    run_git(repo, ["reset", "HEAD"]).map(drop)
}

/// Commits the index and returns the new commit's short hash.
pub fn commit(repo: &Path, message: &str) -> Result<String, GitError> {
    run_git(repo, ["commit", "-m", message])?;
    run_git(repo, ["rev-parse", "--short", "HEAD"])
}

pub fn list_branches(repo: &Path) -> Result<Vec<BranchInfo>, GitError> {
    let out = run_git(
        repo,
        ["branch", "--format=%(refname:short)|%(HEAD)|%(upstream:short)"],
    )?;
    Ok(out.lines().filter_map(parse_branch_line).collect())
}

fn parse_branch_line(line: &str) -> Option<BranchInfo> {
    let mut parts = line.splitn(3, '|').map(str::trim);
    let (name, head, upstream) = (parts.next()?, parts.next()?, parts.next()?);
    Some(BranchInfo {
        name: name.to_string(),
        is_current: head == "*",
        upstream: upstream.to_string(),
    })
}

pub fn switch_branch(repo: &Path, branch: &str) -> Result<(), GitError> {
    run_git(repo, ["switch", branch]).map(drop)
}

pub fn create_branch(repo: &Path, branch: &str) -> Result<(), GitError> {
    run_git(repo, ["switch", "-c", branch]).map(drop)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::process::Stdio;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn run_git_ok(cwd: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(cwd)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .expect("git command should execute");
        assert!(status.success(), "git {args:?} failed with {status}");
    }

    /// One commit on `main` with `README.md` and `src/lib.rs`.
    fn make_repo_fixture() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        run_git_ok(dir.path(), &["init", "-q"]);
        run_git_ok(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git_ok(dir.path(), &["config", "user.name", "Test User"]);
        run_git_ok(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git_ok(dir.path(), &["config", "commit.gpgsign", "false"]);

        fs::create_dir_all(dir.path().join("src")).expect("mkdir src");
        fs::write(dir.path().join("README.md"), "fixture\n").expect("write README");
        fs::write(dir.path().join("src/lib.rs"), "pub fn one() {}\n").expect("write lib");
        run_git_ok(dir.path(), &["add", "."]);
        run_git_ok(dir.path(), &["commit", "-q", "-m", "init"]);
        dir
    }

    fn ignore(patterns: &[&str]) -> IgnoreSet {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        IgnoreSet::new(&patterns)
    }

    #[test]
    fn status_reports_staged_unstaged_and_untracked() {
        let fixture = make_repo_fixture();
        let path = fixture.path();
        fs::write(path.join("src/lib.rs"), "pub fn two() {}\n").expect("modify lib");
        run_git_ok(path, &["add", "src/lib.rs"]);
        fs::write(path.join("src/lib.rs"), "pub fn three() {}\n").expect("modify lib again");
        fs::write(path.join("notes.txt"), "todo\n").expect("write notes");
        fs::write(path.join("debug.log"), "noise\n").expect("write log");

        let status = repo_status(path, "fixture", &["*.log".to_string()]);
        assert_eq!(status.error, None);
        assert_eq!(status.branch, "main");
        assert_eq!((status.ahead, status.behind), (1, 0));
        assert_eq!(
            status.files,
            vec![
                FileEntry::new("src/lib.rs", FileStatus::Modified, Staging::Staged),
                FileEntry::new("src/lib.rs", FileStatus::Modified, Staging::Unstaged),
                FileEntry::new("notes.txt", FileStatus::Untracked, Staging::Unstaged),
            ]
        );
    }

    #[test]
    fn status_outside_a_repository_sets_the_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let status = repo_status(dir.path(), "plain", &[]);
        assert!(status.error.is_some());
        assert!(status.files.is_empty());
    }

    #[test]
    fn status_of_a_repository_without_commits_lists_its_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path();
        run_git_ok(path, &["init", "-q"]);
        run_git_ok(path, &["symbolic-ref", "HEAD", "refs/heads/trunk"]);
        fs::write(path.join("a.txt"), "a\n").expect("write a");
        fs::write(path.join("b.txt"), "b\n").expect("write b");
        run_git_ok(path, &["add", "a.txt"]);

        let status = repo_status(path, "fresh", &[]);
        assert_eq!(status.error, None);
        assert_eq!(status.branch, "trunk");
        assert_eq!((status.ahead, status.behind), (0, 0));
        assert_eq!(
            status.files,
            vec![
                FileEntry::new("a.txt", FileStatus::Added, Staging::Staged),
                FileEntry::new("b.txt", FileStatus::Untracked, Staging::Unstaged),
            ]
        );
    }

    #[test]
    fn porcelain_keeps_rename_source() {
        let entries = parse_porcelain("R  old.rs -> new.rs\n?? scratch/a.txt", &ignore(&[]));
        assert_eq!(
            entries,
            vec![
                FileEntry {
                    path: "new.rs".to_string(),
                    status: FileStatus::Renamed,
                    staging: Staging::Staged,
                    orig_path: Some("old.rs".to_string()),
                },
                FileEntry::new("scratch/a.txt", FileStatus::Untracked, Staging::Unstaged),
            ]
        );
    }

    #[test]
    fn ignore_globs_match_path_or_file_name() {
        let set = ignore(&["*.lock", "target/*", "tmp?.txt", "[!a]x.rs"]);
        assert!(set.is_ignored("Cargo.lock"));
        assert!(set.is_ignored("crates/app/Cargo.lock"));
        assert!(set.is_ignored("target/debug"));
        assert!(!set.is_ignored("target/debug/app"));
        assert!(set.is_ignored("tmp1.txt"));
        assert!(!set.is_ignored("tmp10.txt"));
        assert!(set.is_ignored("bx.rs"));
        assert!(!set.is_ignored("ax.rs"));
        assert!(!set.is_ignored("src/main.rs"));
    }

    #[test]
    fn invalid_ignore_globs_are_skipped() {
        let set = ignore(&["a[", "*.lock"]);
        assert_eq!(set.len(), 1);
        assert!(set.is_ignored("Cargo.lock"));
        assert!(!set.is_ignored("a["));
        assert!(!set.is_ignored("ab"));
        assert!(ignore(&[]).is_empty());
    }

    #[test]
    fn graph_lines_split_commits_from_connectors() {
        assert_eq!(
            parse_graph_line("| * COMMIT:abc1234| (HEAD -> main, origin/main)|feat: add login"),
            GraphLine {
                graph_chars: "| * ".to_string(),
                hash: "abc1234".to_string(),
                refs: "(HEAD -> main, origin/main)".to_string(),
                message: "feat: add login".to_string(),
                is_commit: true,
            }
        );
        assert_eq!(
            parse_graph_line("|/"),
            GraphLine {
                graph_chars: "|/".to_string(),
                ..GraphLine::default()
            }
        );
        // A `|` in the subject stays in the message.
        assert_eq!(parse_graph_line("* COMMIT:1|| a | b").message, "a | b");
    }

    #[test]
    fn commit_returns_hash_shown_in_graph_and_detail() {
        let fixture = make_repo_fixture();
        let path = fixture.path();
        fs::write(path.join("src/lib.rs"), "pub fn one() {}\npub fn two() {}\n")
            .expect("modify lib");
        stage(path, "src/lib.rs").expect("stage");

        let hash = commit(path, "feat: two\n\nbody line").expect("commit");
        let lines = graph(path, 10).expect("graph");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].hash, hash);
        assert_eq!(lines[0].message, "feat: two");
        assert!(lines[0].refs.contains("main"));

        let detail = commit_detail(path, &hash).expect("detail");
        assert!(detail.hash.starts_with(&hash));
        assert_eq!(detail.author, "Test User");
        assert_eq!(detail.message, "feat: two\n\nbody line");
        assert_eq!(
            detail.files,
            vec![CommitFileStat {
                path: "src/lib.rs".to_string(),
                added: 1,
                deleted: 0,
            }]
        );
        assert!(detail.parsed_date().is_some());

        let diff = commit_file_diff(path, &hash, "src/lib.rs").expect("file diff");
        assert!(diff.starts_with("diff --git"));
        assert!(diff.contains("+pub fn two() {}"));
    }

    #[test]
    fn commit_detail_without_stat_block_is_all_message() {
        let detail =
            parse_commit_detail("abc\nDev\n2024-03-05 14:22:01 +0100\nmerge branch\n")
                .expect("detail");
        assert_eq!(detail.message, "merge branch");
        assert!(detail.files.is_empty());
        assert!(parse_commit_detail("abc\nDev").is_err());
    }

    #[test]
    fn stat_lines_resolve_renames_and_binaries() {
        assert_eq!(
            parse_stat_line(" src/{old => new}/f.rs | 3 ++-"),
            Some(CommitFileStat {
                path: "src/new/f.rs".to_string(),
                added: 2,
                deleted: 1,
            })
        );
        assert_eq!(
            parse_stat_line(" a.rs => b.rs | 0").map(|stat| stat.path),
            Some("b.rs".to_string())
        );
        assert_eq!(
            parse_stat_line(" logo.png | Bin 0 -> 1234 bytes"),
            Some(CommitFileStat {
                path: "logo.png".to_string(),
                added: 0,
                deleted: 0,
            })
        );
        assert_eq!(parse_stat_line("no bar here"), None);
    }

    #[test]
    fn file_diff_covers_staged_unstaged_and_untracked() {
        let fixture = make_repo_fixture();
        let path = fixture.path();
        fs::write(path.join("README.md"), "fixture\nmore\n").expect("modify README");
        fs::write(path.join("new.txt"), "one\ntwo\n").expect("write new");

        let unstaged = FileEntry::new("README.md", FileStatus::Modified, Staging::Unstaged);
        assert!(file_diff(path, &unstaged).expect("diff").contains("+more"));

        let untracked = FileEntry::new("new.txt", FileStatus::Untracked, Staging::Unstaged);
        assert_eq!(
            file_diff(path, &untracked).expect("untracked diff"),
            "--- /dev/null\n+++ b/new.txt\n@@ -0,0 +1,2 @@\n+one\n+two\n"
        );

        stage_all(path).expect("stage all");
        let staged = FileEntry::new("README.md", FileStatus::Modified, Staging::Staged);
        assert!(file_diff(path, &staged).expect("cached diff").contains("+more"));
        assert_eq!(file_diff(path, &unstaged).expect("empty diff"), "");

        unstage_all(path).expect("unstage all");
        let status = repo_status(path, "fixture", &[]);
        assert!(status.files.iter().all(|file| file.staging == Staging::Unstaged));
    }

    #[test]
    fn unstage_moves_a_file_back_to_the_worktree() {
        let fixture = make_repo_fixture();
        let path = fixture.path();
        fs::write(path.join("README.md"), "changed\n").expect("modify README");
        stage(path, "README.md").expect("stage");
        assert_eq!(repo_status(path, "fixture", &[]).files[0].staging, Staging::Staged);
        unstage(path, "README.md").expect("unstage");
        assert_eq!(
            repo_status(path, "fixture", &[]).files,
            vec![FileEntry::new("README.md", FileStatus::Modified, Staging::Unstaged)]
        );
    }

    #[test]
    fn branches_can_be_created_listed_and_switched() {
        let fixture = make_repo_fixture();
        let path = fixture.path();
        create_branch(path, "feat/login").expect("create");
        assert_eq!(
            list_branches(path).expect("branches"),
            vec![
                BranchInfo {
                    name: "feat/login".to_string(),
                    is_current: true,
                    upstream: String::new(),
                },
                BranchInfo {
                    name: "main".to_string(),
                    is_current: false,
                    upstream: String::new(),
                },
            ]
        );
        switch_branch(path, "main").expect("switch");
        assert_eq!(repo_status(path, "fixture", &[]).branch, "main");

        let err = switch_branch(path, "missing").expect_err("unknown branch");
        assert!(err.to_string().starts_with("git switch missing: "));
    }

    #[test]
    fn project_statuses_keep_config_order() {
        let first = make_repo_fixture();
        let second = make_repo_fixture();
        let projects = vec![ProjectConfig {
            name: "work".to_string(),
            path: None,
            repos: [first.path(), second.path()]
                .into_iter()
                .map(|path| deck_core::config::RepoConfig {
                    path: path.to_path_buf(),
                    ignore_patterns: Vec::new(),
                })
                .collect(),
        }];
        let statuses = project_statuses(&projects);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name, "work");
        let paths: Vec<&Path> = statuses[0].repos.iter().map(|repo| repo.path.as_path()).collect();
        assert_eq!(paths, vec![first.path(), second.path()]);
        assert_eq!(statuses[0].repos[0].name, repo_name(first.path()));
    }
}
