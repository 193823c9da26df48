//! Productivity dashboard CLI library.
//!
//! This crate hosts the dashboard core: it loads configuration, reads
//! backend snapshots, and drives the timeline and session monitor.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SessionAction};
pub use config::Config;
