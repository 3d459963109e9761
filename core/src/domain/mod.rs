//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod group;
mod port;
mod stats;

// Re-export all domain types
pub use group::{process_ports, GroupId, PortGroup, ProcessedPorts};
pub use port::{PortInfo, ProcessType, Protocol};
pub use stats::{
    current_rank, generate_kill_message, next_rank, KillMessage, KillStats, MessageColor, Rank,
    RANKS,
};
