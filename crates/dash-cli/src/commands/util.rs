//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use dash_core::{CalendarEvent, Task};
use serde::Deserialize;

/// Events and tasks as fetched from the backend by the host.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Reads a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Loads a backend snapshot from JSON.
pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = read_input(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot JSON in {}", path.display()))?;
    tracing::debug!(
        events = snapshot.events.len(),
        tasks = snapshot.tasks.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD (e.g., 2026-10-19)"))
}
