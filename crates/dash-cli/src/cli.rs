//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dash_core::DomainView;

/// Personal productivity dashboard.
///
/// Composes calendar events and tasks into a day-by-day timeline and runs the
/// inactivity logout monitor.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show upcoming events and tasks grouped by day.
    Timeline {
        /// JSON snapshot with `events` and `tasks` arrays (`-` for stdin).
        #[arg(short, long)]
        input: PathBuf,

        /// Domain to show (combined, personal, work, church).
        #[arg(long)]
        view: Option<DomainView>,

        /// Days ahead to include.
        #[arg(long)]
        horizon: Option<u32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List overdue and due-today tasks.
    Attention {
        /// JSON snapshot with a `tasks` array (`-` for stdin).
        #[arg(short, long)]
        input: PathBuf,

        /// Domain to show (combined, personal, work, church).
        #[arg(long)]
        view: Option<DomainView>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the inactivity logout monitor.
    #[command(subcommand)]
    Session(SessionAction),

    /// Expand a recurrence rule into upcoming dates.
    Recur {
        /// Encoded rule, e.g. `FREQ=WEEKLY;BYDAY=MO,TH`.
        #[arg(long)]
        rule: String,

        /// Date to count from (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        from: Option<String>,

        /// Number of occurrences to list.
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

/// Ways to drive the session monitor.
#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Replay a scripted sequence of activity against simulated time.
    Simulate {
        /// Script file with `<ms> <action> [arg]` lines (`-` for stdin).
        #[arg(short, long)]
        script: PathBuf,
    },

    /// Monitor live input: `activity <kind>`, `reset` or `stop` per stdin line.
    Watch,
}
