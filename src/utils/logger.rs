use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_LOG_FILE: &str = "explorer.log";

static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Filter from a level or directive string such as `info,rs_block_explorer=debug`.
/// An unparsable value falls back to `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Directory and file name for the daily rolling appender.
pub fn split_log_path(file_path: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(file_path);
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR));
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
    (dir.to_path_buf(), PathBuf::from(name))
}

/// Install the global subscriber: console always, plus a daily rolling file when `to_file`.
///
/// Fails when a subscriber is already installed or the log directory cannot be created.
pub fn init_logger(cfg: &LoggingConfig) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stdout);

    if !cfg.to_file {
        tracing_subscriber::registry()
            .with(build_filter(&cfg.level))
            .with(console_layer)
            .try_init()?;
        return Ok(());
    }

    let (dir, name) = split_log_path(&cfg.file_path);
    fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(rolling::daily(&dir, name));
    GUARD.set(guard).ok();

    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(build_filter(&cfg.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}
