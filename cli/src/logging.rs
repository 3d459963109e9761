//! Tracing setup.
//!
//! The dashboard owns the terminal, so while it runs logs go to a file.
//! One-shot commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PORTSLAY_LOG";

pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init(target: LogTarget) -> anyhow::Result<()> {
    match target {
        LogTarget::File(path) => {
            let file = open_log(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter("info"))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter("warn"))
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

fn open_log(path: &Path) -> anyhow::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_log_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("portslay.log");
        open_log(&path).unwrap();
        assert!(path.exists());
    }
}
