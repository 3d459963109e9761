//! JSON-file kill statistics store.

use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;

use crate::config::{app_file, read_json_or_default, write_json_atomic};
use crate::domain::{KillStats, PortInfo};
use crate::error::Result;
use crate::ports::StatsRepository;

/// Kill statistics persisted at `~/.portslay/stats.json`.
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: app_file("stats.json")?,
        })
    }

    /// Create a stats store with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StatsRepository for StatsStore {
    async fn load_stats(&self) -> Result<KillStats> {
        read_json_or_default(&self.path).await
    }

    async fn record_kill(&self, port: &PortInfo, success: bool, force: bool) -> Result<KillStats> {
        let mut stats: KillStats = read_json_or_default(&self.path).await?;
        stats.record(port, success, force, Utc::now());
        write_json_atomic(&self.path, &stats).await?;
        debug!(total = stats.total_kills, "kill stats updated");
        Ok(stats)
    }
}
