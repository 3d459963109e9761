//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer and the
//! dashboard use to interact with external systems. Implementations live in
//! `adapters`.

mod killer;
mod scanner;
mod stats;

pub use killer::ProcessKillerPort;
pub use scanner::PortScannerPort;
pub use stats::StatsRepository;
