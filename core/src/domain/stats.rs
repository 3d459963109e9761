//! Kill statistics, ranks and kill feedback messages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PortInfo;

// ============================================================================
// KillStats
// ============================================================================

/// Running totals of kills performed from the dashboard or the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillStats {
    #[serde(default)]
    pub total_kills: u64,
    #[serde(default)]
    pub force_kills: u64,
    #[serde(default)]
    pub failed_kills: u64,
    /// Successful kills per process name.
    #[serde(default)]
    pub kills_by_process: BTreeMap<String, u64>,
    #[serde(default)]
    pub first_kill_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_kill_at: Option<DateTime<Utc>>,
}

impl KillStats {
    /// Account for one kill attempt.
    pub fn record(&mut self, port: &PortInfo, success: bool, force: bool, at: DateTime<Utc>) {
        if !success {
            self.failed_kills += 1;
            return;
        }
        self.total_kills += 1;
        if force {
            self.force_kills += 1;
        }
        *self
            .kills_by_process
            .entry(port.process_name.clone())
            .or_insert(0) += 1;
        self.first_kill_at.get_or_insert(at);
        self.last_kill_at = Some(at);
    }

    /// The process name killed most often, ties broken alphabetically.
    pub fn favorite_target(&self) -> Option<(&str, u64)> {
        self.kills_by_process
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, count)| (name.as_str(), *count))
    }
}

// ============================================================================
// Ranks
// ============================================================================

/// A rank earned by reaching a total kill count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    pub name: &'static str,
    pub min_kills: u64,
    pub emoji: Option<&'static str>,
}

/// Rank thresholds, ascending.
pub const RANKS: &[Rank] = &[
    Rank { name: "Bystander", min_kills: 0, emoji: None },
    Rank { name: "Port Janitor", min_kills: 1, emoji: Some("🧹") },
    Rank { name: "Socket Sweeper", min_kills: 10, emoji: Some("🧽") },
    Rank { name: "Process Hunter", min_kills: 25, emoji: Some("🏹") },
    Rank { name: "Daemon Slayer", min_kills: 50, emoji: Some("⚔️") },
    Rank { name: "Port Reaper", min_kills: 100, emoji: Some("💀") },
    Rank { name: "Kernel Overlord", min_kills: 250, emoji: Some("👑") },
];

/// Highest rank whose threshold `total_kills` meets.
pub fn current_rank(total_kills: u64) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| total_kills >= r.min_kills)
        .copied()
        .unwrap_or(RANKS[0])
}

/// The next rank to reach, if any remains.
pub fn next_rank(total_kills: u64) -> Option<Rank> {
    RANKS.iter().find(|r| r.min_kills > total_kills).copied()
}

// ============================================================================
// Kill messages
// ============================================================================

/// Severity hint for a kill message; the dashboard maps it to toast colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageColor {
    Red,
    Yellow,
    Cyan,
    #[default]
    Green,
}

/// Feedback text for a finished kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillMessage {
    pub message: String,
    pub emoji: Option<&'static str>,
    pub color: MessageColor,
}

impl KillMessage {
    /// Message text prefixed with its emoji, if any.
    pub fn display_text(&self) -> String {
        match self.emoji {
            Some(emoji) => format!("{} {}", emoji, self.message),
            None => self.message.clone(),
        }
    }
}

const GRACEFUL_LINES: &[&str] = &[
    "asked {name} nicely to leave :{port}",
    "{name} packed its bags and freed :{port}",
    ":{port} is open for business again ({name} retired)",
];

const FORCE_LINES: &[&str] = &[
    "{name} was shown the door on :{port}",
    "no mercy: {name} evicted from :{port}",
    ":{port} reclaimed by force from {name}",
];

const FAILURE_LINES: &[&str] = &[
    "{name} on :{port} refused to die",
    "could not take down {name} on :{port}",
];

/// Build the feedback message for a kill attempt.
///
/// The phrasing is picked deterministically from the port number so the same
/// kill always reads the same way.
pub fn generate_kill_message(port: &PortInfo, success: bool, force: bool) -> KillMessage {
    let (lines, emoji, color) = match (success, force) {
        (true, false) => (GRACEFUL_LINES, Some("✅"), MessageColor::Green),
        (true, true) => (FORCE_LINES, Some("💥"), MessageColor::Red),
        (false, _) => (FAILURE_LINES, Some("⚠️"), MessageColor::Yellow),
    };
    let template = lines[usize::from(port.port) % lines.len()];
    let message = template
        .replace("{name}", &port.process_name)
        .replace("{port}", &port.port.to_string());

    KillMessage {
        message,
        emoji,
        color,
    }
}
