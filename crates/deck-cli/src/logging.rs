//! File logging. The terminal belongs to the dashboard, so every event goes
//! to a log file instead of stderr.

use std::fs;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::Context;
use clap::Args;
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LoggingArgs {
    /// Minimum level written to the log. `RUST_LOG` takes precedence.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Defaults to `deck.log` in the platform data directory.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("deck").join("deck.log"))
}

/// Installs the global subscriber. Returns the file being written.
pub fn init(args: &LoggingArgs) -> anyhow::Result<PathBuf> {
    let path = args
        .log_file
        .clone()
        .or_else(default_log_path)
        .context("no data directory for the log file; pass --log-file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    let installed = match args.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow!("installing log subscriber: {err}"))?;
    Ok(path)
}
