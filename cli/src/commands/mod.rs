//! One-shot subcommands.

pub mod kill;
pub mod list;
pub mod stats;
