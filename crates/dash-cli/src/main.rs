use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dash_cli::commands::{attention, recur, session, timeline, util};
use dash_cli::{Cli, Commands, Config, SessionAction};
use dash_core::{SystemClock, TimelineComposer};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Timeline {
            input,
            view,
            horizon,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let snapshot = util::load_snapshot(input)?;
            let query = config.timeline_query(*view, *horizon);
            let composer = TimelineComposer::new(SystemClock);
            timeline::run(&mut out, &composer, &snapshot, &query, *json)?;
        }
        Some(Commands::Attention { input, view, json }) => {
            let config = load_config(cli.config.as_deref())?;
            let snapshot = util::load_snapshot(input)?;
            let view = view.unwrap_or(config.default_view);
            attention::run(&mut out, &snapshot.tasks, view, &Local::now(), *json)?;
        }
        Some(Commands::Session(action)) => {
            let config = load_config(cli.config.as_deref())?;
            match action {
                SessionAction::Simulate { script } => session::run_simulate(
                    &mut out,
                    script,
                    config.session(),
                    config.session_tracking,
                )?,
                SessionAction::Watch => {
                    session::watch(&mut out, config.session(), config.session_tracking)?;
                }
            }
        }
        Some(Commands::Recur { rule, from, count }) => {
            let today = Local::now().date_naive();
            let from = from.as_deref().map(util::parse_date).transpose()?;
            recur::run(&mut out, rule, from.unwrap_or(today), today, *count)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
