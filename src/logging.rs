//! Tracing setup for DramaTUI
//!
//! Logs go to stderr for plain CLI commands. While the player screen owns the
//! terminal they go to a file instead, so they do not tear the alternate screen.

use anyhow::{Context, Result};
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Default log file (~/.cache/dramatui/dramatui.log)
pub fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dramatui")
        .join("dramatui.log")
}

/// Map the repeatable `-v` flag to a level
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the crate logs at `level`
fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,dramatui={}", level)))
}

/// Install the global subscriber
pub fn init(level: Level, target: &LogTarget) -> Result<()> {
    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter(level))
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?,
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(level))
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?
        }
    }
    tracing::debug!(log_target = ?target, %level, "tracing initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to open {}", path.display()))
}
