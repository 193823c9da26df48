//! Timeline command: upcoming events and tasks grouped by day.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use dash_core::format::{day_header, format_duration_minutes};
use dash_core::{
    Clock, DayBucket, DomainView, TimelineComposer, TimelineEntry, TimelineItem, TimelineQuery,
};
use serde::Serialize;

use super::util::Snapshot;

/// JSON shape of `dash timeline --json`.
#[derive(Debug, Serialize)]
pub struct TimelineReport {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub view: DomainView,
    pub horizon_days: u32,
    pub days: Vec<DayBucket>,
}

pub fn run<W, C>(
    writer: &mut W,
    composer: &TimelineComposer<C>,
    snapshot: &Snapshot,
    query: &TimelineQuery,
    json: bool,
) -> Result<()>
where
    W: Write,
    C: Clock,
    <C::Tz as TimeZone>::Offset: Display,
{
    let composed = composer.compose_days(&snapshot.events, &snapshot.tasks, query);

    if json {
        let report = TimelineReport {
            generated_at: composed.now.with_timezone(&Utc),
            timezone: iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()),
            view: query.view,
            horizon_days: query.horizon_days,
            days: composed.days,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Timeline · {} · next {} days",
        query.view, query.horizon_days
    )?;

    if composed.days.is_empty() {
        writeln!(writer, "Nothing scheduled.")?;
        return Ok(());
    }

    let today = composed.now.date_naive();
    let tz = composed.now.timezone();
    for day in &composed.days {
        writeln!(writer)?;
        writeln!(writer, "{}", day_header(day.date, today))?;
        for item in &day.items {
            writeln!(writer, "  {}", format_item(item, &tz))?;
        }
    }

    Ok(())
}

fn format_item<Tz>(item: &TimelineItem, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match &item.entry {
        TimelineEntry::Event { event } => {
            let when = if event.all_day {
                "all day".to_string()
            } else {
                event.start.with_timezone(tz).format("%H:%M").to_string()
            };
            let minutes = if event.duration_minutes > 0 {
                event.duration_minutes
            } else {
                (event.end - event.start).num_minutes()
            };
            format!(
                "{when:<8}{} · {} · {}",
                item.title,
                format_duration_minutes(minutes),
                item.domain
            )
        }
        TimelineEntry::Task { task } => {
            let check = if task.completed { "[x]" } else { "[ ]" };
            let priority = if task.priority.trim().is_empty() {
                "No priority"
            } else {
                task.priority.trim()
            };
            format!("{check:<8}{} · {priority} · {}", item.title, item.domain)
        }
    }
}
