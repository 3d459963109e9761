//! List command - show all listening ports.

use anyhow::Result;
use portslay_core::{PortInfo, PortScanner, PortService};

use crate::tui::{format_lifetime, sort::sort_for_cli};

pub async fn run(
    port_filter: Option<u16>,
    name_filter: Option<String>,
    sort: &str,
    json: bool,
) -> Result<()> {
    let service = PortService::new(PortScanner::new());
    let mut ports = service.detect().await?;
    retain_matching(&mut ports, port_filter, name_filter.as_deref());
    sort_for_cli(&mut ports, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No listening ports found.");
        return Ok(());
    }

    for line in table(&ports) {
        println!("{}", line);
    }
    println!("\nTotal: {} ports", ports.len());
    Ok(())
}

fn retain_matching(ports: &mut Vec<PortInfo>, port: Option<u16>, name: Option<&str>) {
    if let Some(p) = port {
        ports.retain(|info| info.port == p);
    }
    if let Some(name) = name {
        let name_lower = name.to_lowercase();
        ports.retain(|info| info.process_name.to_lowercase().contains(&name_lower));
    }
}

fn table(ports: &[PortInfo]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<6} {:<5} {:<8} {:<20} {:<12} {:<10} {:<8} COMMAND",
            "PORT", "PROTO", "PID", "PROCESS", "TYPE", "USER", "UPTIME"
        ),
        "-".repeat(96),
    ];
    for info in ports {
        lines.push(format!(
            "{:<6} {:<5} {:<8} {:<20} {:<12} {:<10} {:<8} {}",
            info.port,
            info.protocol.as_str(),
            info.pid,
            truncate(&info.process_name, 20),
            info.category().display_name(),
            truncate(&info.user, 10),
            format_lifetime(info.lifetime),
            truncate(&info.command, 40),
        ));
    }
    lines
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
