//! Kill statistics repository port (interface).

use crate::domain::{KillStats, PortInfo};
use crate::error::Result;

/// Port for kill statistics persistence.
pub trait StatsRepository: Send + Sync {
    /// Load the current statistics; a missing store yields empty stats.
    fn load_stats(&self) -> impl std::future::Future<Output = Result<KillStats>> + Send;

    /// Record one kill attempt and return the updated statistics.
    fn record_kill(
        &self,
        port: &PortInfo,
        success: bool,
        force: bool,
    ) -> impl std::future::Future<Output = Result<KillStats>> + Send;
}
