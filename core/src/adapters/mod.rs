//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod killer;
pub mod scanner;
pub mod stats_store;

// Re-export main types for convenience
pub use killer::ProcessKiller;
pub use scanner::PortScanner;
pub use stats_store::StatsStore;
