//! Kill command - terminate every process bound to a port.

use anyhow::Result;
use portslay_core::{
    generate_kill_message, PortScanner, PortService, ProcessKiller, ProcessKillerPort,
    StatsRepository, StatsStore,
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KillOutcome {
    port: u16,
    pid: u32,
    process_name: String,
    force: bool,
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(port: u16, force: bool, json: bool) -> Result<()> {
    let service = PortService::new(PortScanner::new());
    let targets = service.find_by_port(port).await?;

    if targets.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No process found on port {}", port);
        }
        return Ok(());
    }

    let killer = ProcessKiller::new();
    let stats = StatsStore::new()?;
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in &targets {
        let (success, error) = match killer.kill(target.pid, force).await {
            Ok(gone) => (gone, None),
            Err(err) => (false, Some(err.to_string())),
        };
        if let Err(err) = stats.record_kill(target, success, force).await {
            warn!(error = %err, "failed to persist kill stats");
        }
        outcomes.push(KillOutcome {
            port: target.port,
            pid: target.pid,
            process_name: target.process_name.clone(),
            force,
            success,
            message: generate_kill_message(target, success, force).display_text(),
            error,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for outcome in &outcomes {
        println!("{}", outcome.message);
        if let Some(error) = &outcome.error {
            println!("   pid {}: {}", outcome.pid, error);
        }
    }
    Ok(())
}
