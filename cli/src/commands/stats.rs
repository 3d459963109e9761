//! Stats command - show kill statistics and rank.

use anyhow::Result;
use portslay_core::{current_rank, next_rank, StatsRepository, StatsStore};

use crate::tui::stats_lines;

pub async fn run(json: bool) -> Result<()> {
    let store = StatsStore::new()?;
    let stats = store.load_stats().await?;

    if json {
        let value = serde_json::json!({
            "stats": stats,
            "rank": current_rank(stats.total_kills),
            "nextRank": next_rank(stats.total_kills),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for line in stats_lines(&stats) {
        println!("{}", line);
    }
    Ok(())
}
