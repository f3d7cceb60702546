mod keymap;
mod logging;
mod ui;
mod worker;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use deck_core::config;
use deck_core::config::Config;
use tracing::info;
use tracing::warn;

use crate::logging::LoggingArgs;

/// Keyboard-driven dashboard for many git repositories.
#[derive(Parser, Debug)]
#[command(name = "deck", version)]
struct Args {
    /// Config file. Defaults to `deck/config.toml` in the platform config
    /// directory.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingArgs,

    /// Milliseconds between status polls.
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(100..))]
    poll_ms: u64,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_path = logging::init(&args.logging)?;
    info!(log = %log_path.display(), version = env!("CARGO_PKG_VERSION"), "starting deck");

    let (config, config_path) = load_config(args.config)?;
    ui::run(config, config_path, Duration::from_millis(args.poll_ms))
}

/// An explicit `--config` must load. The default location may be absent, in
/// which case the built-in defaults are used and saved there on first edit.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<(Config, PathBuf)> {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => (config::default_config_path(), false),
    };
    if !required && !path.exists() {
        warn!(path = %path.display(), "no config file, using defaults");
        return Ok((Config::default(), path));
    }
    let config = config::load(&path)
        .with_context(|| format!("loading config {}", path.display()))?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::logging::LogFormat;
    use crate::logging::LogLevel;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["deck"]).expect("parse");
        assert_eq!(args.config, None);
        assert_eq!(args.poll_ms, 2000);
        assert_eq!(args.logging.log_level, LogLevel::Warn);
        assert_eq!(args.logging.log_format, LogFormat::Text);
        assert_eq!(args.logging.log_file, None);
    }

    #[test]
    fn every_flag_parses() {
        let args = Args::try_parse_from([
            "deck",
            "--config",
            "/tmp/deck.toml",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-file",
            "/tmp/deck.log",
            "--poll-ms",
            "500",
        ])
        .expect("parse");
        assert_eq!(args.config, Some(PathBuf::from("/tmp/deck.toml")));
        assert_eq!(args.logging.log_level, LogLevel::Debug);
        assert_eq!(args.logging.log_format, LogFormat::Json);
        assert_eq!(args.logging.log_file, Some(PathBuf::from("/tmp/deck.log")));
        assert_eq!(args.poll_ms, 500);
    }

    #[test]
    fn poll_interval_has_a_floor() {
        assert!(Args::try_parse_from(["deck", "--poll-ms", "10"]).is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(Some(dir.path().join("missing.toml"))).expect_err("missing");
        assert!(format!("{err:#}").contains("missing.toml"));
    }

    #[test]
    fn explicit_config_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("deck.toml");
        fs::write(&path, "[workspace]\nname = \"home\"\n").expect("write");
        let (config, loaded_from) = load_config(Some(path.clone())).expect("load");
        assert_eq!(config.workspace_name(), "home");
        assert_eq!(loaded_from, path);
    }
}
