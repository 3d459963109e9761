//! PortSlay Core Library
//!
//! Port discovery, process grouping and process termination for the
//! `portslay` dashboard. Provides functionality to:
//! - Scan listening TCP ports and bound UDP sockets
//! - Group ports by process category, keeping per-group UI state stable
//! - Kill processes by PID (gracefully or forcefully)
//! - Track kill statistics and ranks
//! - Load user configuration
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Uses `ss` and `ps` commands
//! - macOS: Uses `lsof` and `ps` commands

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{
    current_rank, generate_kill_message, next_rank, process_ports, GroupId, KillMessage,
    KillStats, MessageColor, PortGroup, PortInfo, ProcessType, ProcessedPorts, Protocol, Rank,
};

// Re-export other commonly used types
pub use adapters::{PortScanner, ProcessKiller, StatsStore};
pub use application::PortService;
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::{PortScannerPort, ProcessKillerPort, StatsRepository};
