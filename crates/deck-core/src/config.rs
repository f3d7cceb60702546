use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_GRAPH_MAX_COMMITS: usize = 50;
pub const DEFAULT_DASHBOARD_WIDTH: u16 = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{what} path {path} does not exist")]
    MissingPath { what: &'static str, path: PathBuf },
    #[error("{what} path {path} is not a directory")]
    NotADirectory { what: &'static str, path: PathBuf },
    #[error("serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("writing config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    #[serde(rename = "project", skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectConfig>,
    /// Repositories listed at top level, outside any project.
    #[serde(rename = "repo", skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<RepoConfig>,
    pub display: DisplayConfig,
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig::default(),
            projects: Vec::new(),
            repos: Vec::new(),
            display: DisplayConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub name: Option<String>,
    pub scan_root: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(rename = "repo", skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<RepoConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_patterns: Vec<String>,
}

impl RepoConfig {
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub group_folders: bool,
    pub group_docs: bool,
    pub show_graph: bool,
    pub show_conductor: bool,
    pub graph_max_commits: usize,
    /// Dashboard column width in percent of the terminal.
    pub dashboard_width: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<PriorityRule>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            group_folders: false,
            group_docs: false,
            show_graph: true,
            show_conductor: false,
            graph_max_commits: DEFAULT_GRAPH_MAX_COMMITS,
            dashboard_width: DEFAULT_DASHBOARD_WIDTH,
            priority: Vec::new(),
        }
    }
}

impl DisplayConfig {
    pub fn resolved_priority(&self) -> Vec<PriorityRule> {
        if self.priority.is_empty() {
            default_priority_rules()
        } else {
            self.priority.clone()
        }
    }

    pub fn resolved_graph_max_commits(&self) -> usize {
        if self.graph_max_commits == 0 {
            DEFAULT_GRAPH_MAX_COMMITS
        } else {
            self.graph_max_commits
        }
    }

    pub fn resolved_dashboard_width(&self) -> u16 {
        if (1..80).contains(&self.dashboard_width) {
            self.dashboard_width
        } else {
            DEFAULT_DASHBOARD_WIDTH
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PriorityRule {
    pub tier: u8,
    pub extensions: Vec<String>,
    pub directories: Vec<String>,
}

pub fn default_priority_rules() -> Vec<PriorityRule> {
    fn rule(tier: u8, extensions: &[&str], directories: &[&str]) -> PriorityRule {
        PriorityRule {
            tier,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            directories: directories.iter().map(|dir| dir.to_string()).collect(),
        }
    }
    vec![
        rule(
            1,
            &[".js", ".ts", ".jsx", ".tsx", ".svelte", ".go", ".rs"],
            &["src", "lib", "components", "routes", "models", "resolvers"],
        ),
        rule(2, &[".json", ".toml", ".yaml", ".yml", ".css", ".scss"], &[]),
        rule(3, &[".md"], &[]),
        rule(3, &[], &["scripts"]),
    ]
}

/// Hex colours; anything left unset falls back to the built-in palette.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeConfig {
    pub bg: Option<String>,
    pub fg: Option<String>,
    pub accent: Option<String>,
    pub accent2: Option<String>,
    pub muted: Option<String>,
    pub dim: Option<String>,
    pub staged: Option<String>,
    pub unstaged: Option<String>,
    pub diff_add: Option<String>,
    pub diff_remove: Option<String>,
    pub diff_hunk: Option<String>,
    pub branch: Option<String>,
    pub error: Option<String>,
    pub cursor_bg: Option<String>,
    pub border: Option<String>,
    pub status_bar_bg: Option<String>,
    pub status_bar_fg: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub graph_colors: Vec<String>,
}

impl Config {
    pub fn workspace_name(&self) -> &str {
        self.workspace
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("deck")
    }

    /// Projects in display order. Top-level repos are gathered into a
    /// trailing project named after the workspace.
    pub fn resolved_projects(&self) -> Vec<ProjectConfig> {
        let mut projects = self.projects.clone();
        if !self.repos.is_empty() {
            projects.push(ProjectConfig {
                name: self.workspace_name().to_string(),
                path: None,
                repos: self.repos.clone(),
            });
        }
        projects
    }

    pub fn resolved_scan_root(&self) -> PathBuf {
        match self.workspace.scan_root.as_deref() {
            Some(root) if !root.is_empty() => expand_home(Path::new(root)),
            _ => dirs::home_dir()
                .map(|home| home.join("Documents"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("deck").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

pub fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a config file and resolves every project and repo path to an
/// absolute, existing directory.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse(&text, path)?;
    let base = config_dir(path);
    resolve_paths(&mut config, &base)?;
    Ok(config)
}

pub fn resolve_paths(config: &mut Config, base: &Path) -> Result<(), ConfigError> {
    for project in &mut config.projects {
        if let Some(path) = project.path.as_mut() {
            *path = absolutize(path, base);
            check_dir("project", path)?;
        }
        let repo_base = project.path.clone().unwrap_or_else(|| base.to_path_buf());
        for repo in &mut project.repos {
            repo.path = absolutize(&repo.path, &repo_base);
            check_dir("repo", &repo.path)?;
        }
    }
    for repo in &mut config.repos {
        repo.path = absolutize(&repo.path, base);
        check_dir("repo", &repo.path)?;
    }
    Ok(())
}

/// Writes the config back, turning absolute paths into paths relative to the
/// config directory (projects) or their project (repos).
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let base = config_dir(path);
    let mut out = config.clone();
    for project in &mut out.projects {
        let repo_base = project.path.clone().unwrap_or_else(|| base.clone());
        for repo in &mut project.repos {
            repo.path = relative_to(&repo.path, &repo_base);
        }
        if let Some(path) = project.path.as_mut() {
            *path = relative_to(path, &base);
        }
    }
    for repo in &mut out.repos {
        repo.path = relative_to(&repo.path, &base);
    }
    let text = toml::to_string_pretty(&out)?;
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, text).map_err(write_err)
}

fn config_dir(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        normalize(&base.join(expanded))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn check_dir(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::NotADirectory {
            what,
            path: path.to_path_buf(),
        }),
        Err(_) => Err(ConfigError::MissingPath {
            what,
            path: path.to_path_buf(),
        }),
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let shared = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(left, right)| left == right)
        .count();
    if shared == 0 {
        return path.to_path_buf();
    }
    let mut out = PathBuf::new();
    for _ in shared..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[shared..] {
        out.push(part.as_os_str());
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
