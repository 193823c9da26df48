//! Session commands: drive the inactivity monitor from a script or live input.
//!
//! Script lines look like `<ms> <action> [arg]`:
//!
//! ```text
//! # comment
//! 0 start
//! 1000 activity key_down
//! 7000 reset
//! 20000 wait
//! ```
//!
//! Actions are `start [on|off]`, `activity <kind>`, `reset`, `stop` and
//! `wait`. Timers due before a line's time fire first, at their own deadline.

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dash_core::format::countdown_label;
use dash_core::{
    ActivityKind, InstantClock, ManualClock, MonotonicClock, SessionConfig, SessionEvent,
    SessionMonitor,
};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::util::read_input;

/// Pre-compiled regex for script lines.
static SCRIPT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+([a-z_]+)(?:\s+(\S+))?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start(Option<bool>),
    Activity(ActivityKind),
    Reset,
    Stop,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    at_ms: u64,
    action: Action,
}

fn parse_action(name: &str, arg: Option<&str>) -> Result<Action> {
    let action = match (name, arg) {
        ("start", None) => Action::Start(None),
        ("start", Some("on" | "true")) => Action::Start(Some(true)),
        ("start", Some("off" | "false")) => Action::Start(Some(false)),
        ("activity", Some(kind)) => Action::Activity(kind.parse()?),
        ("activity", None) => bail!("activity needs a kind, e.g. `activity click`"),
        ("reset", None) => Action::Reset,
        ("stop", None) => Action::Stop,
        ("wait", None) => Action::Wait,
        (name, Some(arg)) => bail!("unexpected `{name} {arg}`"),
        (name, None) => bail!("unknown action `{name}`"),
    };
    Ok(action)
}

fn parse_script(script: &str) -> Result<Vec<Step>> {
    let mut steps: Vec<Step> = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(caps) = SCRIPT_LINE_RE.captures(line) else {
            bail!("line {line_no}: expected `<ms> <action> [arg]`, got `{line}`");
        };
        let at_ms: u64 = caps[1]
            .parse()
            .with_context(|| format!("line {line_no}: time out of range"))?;
        let action = parse_action(&caps[2], caps.get(3).map(|m| m.as_str()))
            .with_context(|| format!("line {line_no}"))?;

        if let Some(prev) = steps.last().filter(|prev| at_ms < prev.at_ms) {
            bail!(
                "line {line_no}: time {at_ms} ms goes backwards (previous {} ms)",
                prev.at_ms
            );
        }
        steps.push(Step { at_ms, action });
    }
    Ok(steps)
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::WarningStarted { remaining_secs } => {
            format!("warning: logout in {}", countdown_label(*remaining_secs))
        }
        SessionEvent::CountdownTick { remaining_secs } => {
            format!("countdown: {}", countdown_label(*remaining_secs))
        }
        SessionEvent::Expired { logout_error: None } => "expired: logged out".to_string(),
        SessionEvent::Expired {
            logout_error: Some(err),
        } => format!("expired: {err}"),
    }
}

fn stamp(at_ms: u64, message: &str) -> String {
    format!("[{at_ms:>6} ms] {message}")
}

fn apply<W: Write, C: MonotonicClock>(
    writer: &mut W,
    monitor: &mut SessionMonitor<C>,
    action: Action,
    enabled_by_default: bool,
    at_ms: u64,
) -> Result<()> {
    let message = match action {
        Action::Start(enabled) => {
            monitor.start(enabled.unwrap_or(enabled_by_default));
            if monitor.is_running() {
                "start: tracking".to_string()
            } else {
                format!("start: not tracking ({})", monitor.phase())
            }
        }
        Action::Activity(kind) => {
            if monitor.notify_activity(kind) {
                format!("activity {kind}: timer re-armed")
            } else {
                format!("activity {kind}: ignored")
            }
        }
        Action::Reset => {
            if monitor.reset() {
                "reset: active".to_string()
            } else {
                "reset: ignored".to_string()
            }
        }
        Action::Stop => {
            monitor.stop();
            "stop: timers cancelled".to_string()
        }
        Action::Wait => return Ok(()),
    };
    writeln!(writer, "{}", stamp(at_ms, &message))?;
    Ok(())
}

/// Moves simulated time to `target_ms`, firing timers at their deadlines.
fn advance<W: Write>(
    writer: &mut W,
    clock: &ManualClock,
    monitor: &mut SessionMonitor<ManualClock>,
    target_ms: u64,
) -> Result<()> {
    while let Some(deadline) = monitor.next_deadline_ms() {
        if deadline > target_ms {
            break;
        }
        clock.set(deadline);
        for event in monitor.poll() {
            writeln!(writer, "{}", stamp(deadline, &describe(&event)))?;
        }
    }
    clock.set(target_ms);
    Ok(())
}

/// Replays a script against simulated time.
pub fn simulate<W: Write>(
    writer: &mut W,
    script: &str,
    config: SessionConfig,
    enabled: bool,
) -> Result<()> {
    let steps = parse_script(script)?;
    let clock = ManualClock::new();
    let mut monitor = SessionMonitor::new(config, clock.clone(), || {
        tracing::info!("logout requested");
        Ok(())
    });

    for step in steps {
        advance(writer, &clock, &mut monitor, step.at_ms)?;
        apply(writer, &mut monitor, step.action, enabled, step.at_ms)?;
    }

    writeln!(writer, "final: {}", monitor.phase())?;
    Ok(())
}

/// Loads a script file and replays it.
pub fn run_simulate<W: Write>(
    writer: &mut W,
    path: &Path,
    config: SessionConfig,
    enabled: bool,
) -> Result<()> {
    let script = read_input(path)?;
    simulate(writer, &script, config, enabled)
}

fn emit<W: Write, C: MonotonicClock>(
    writer: &mut W,
    monitor: &mut SessionMonitor<C>,
    at_ms: u64,
) -> Result<()> {
    for event in monitor.poll() {
        writeln!(writer, "{}", stamp(at_ms, &describe(&event)))?;
    }
    Ok(())
}

async fn sleep_for(wait_ms: Option<u64>) {
    match wait_ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => std::future::pending().await,
    }
}

async fn watch_loop<W: Write>(writer: &mut W, config: SessionConfig, enabled: bool) -> Result<()> {
    let clock = InstantClock::new();
    let mut monitor = SessionMonitor::new(config, clock, || {
        tracing::info!("logout requested");
        Ok(())
    });
    monitor.start(enabled);
    if !monitor.is_running() {
        writeln!(writer, "session tracking disabled")?;
        return Ok(());
    }
    writeln!(writer, "{}", stamp(0, "start: tracking"))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let wait = monitor
            .next_deadline_ms()
            .map(|deadline| deadline.saturating_sub(clock.now_ms()));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let mut words = line.split_whitespace();
                if let Some(name) = words.next() {
                    // Report whatever came due while the line was pending first.
                    emit(writer, &mut monitor, clock.now_ms())?;
                    match parse_action(name, words.next()) {
                        Ok(action) => apply(writer, &mut monitor, action, enabled, clock.now_ms())?,
                        Err(err) => writeln!(writer, "error: {err:#}")?,
                    }
                }
            }
            () = sleep_for(wait) => {}
        }

        emit(writer, &mut monitor, clock.now_ms())?;
        writer.flush()?;
        if !monitor.is_running() {
            break;
        }
    }

    writeln!(writer, "final: {}", monitor.phase())?;
    Ok(())
}

/// Runs the monitor against real time, reading actions from stdin.
pub fn watch<W: Write>(writer: &mut W, config: SessionConfig, enabled: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(watch_loop(writer, config, enabled))
}
