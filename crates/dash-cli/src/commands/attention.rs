//! Attention command: overdue and due-today tasks.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use dash_core::format::due_label;
use dash_core::{AttentionItem, DomainView, Task, needs_attention};

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    tasks: &[Task],
    view: DomainView,
    now: &DateTime<Tz>,
    json: bool,
) -> Result<()> {
    let items = needs_attention(tasks, view, now);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&items)?)?;
        return Ok(());
    }

    if items.is_empty() {
        writeln!(writer, "Nothing needs attention ({view}).")?;
        return Ok(());
    }

    writeln!(writer, "Needs attention ({view}): {}", items.len())?;
    let today = now.date_naive();
    for item in &items {
        writeln!(writer, "  {}", format_item(item, today))?;
    }
    Ok(())
}

fn format_item(item: &AttentionItem, today: chrono::NaiveDate) -> String {
    let priority = item.task.priority.trim();
    let priority = if priority.is_empty() {
        "No priority"
    } else {
        priority
    };
    format!(
        "{:<18}{} · {priority} · {}",
        due_label(item.due, today),
        item.task.title,
        item.domain
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;

    fn tasks() -> Vec<Task> {
        serde_json::from_str(
            r#"[
                {"id": "a", "title": "Call plumber", "due_date": "2026-10-19", "priority": "High"},
                {"id": "b", "title": "Quarterly review", "due_date": "2026-10-16",
                 "priority": "Critical", "domain": "work"},
                {"id": "c", "title": "Tithe report", "due_date": "2026-10-18",
                 "labels": ["ministry"]},
                {"id": "d", "title": "Done already", "due_date": "2026-10-10", "completed": true},
                {"id": "e", "title": "Next week", "due_date": "2026-10-26"}
            ]"#,
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap()
    }

    #[test]
    fn lists_most_overdue_first() {
        let mut output = Vec::new();
        run(&mut output, &tasks(), DomainView::Combined, &now(), false).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output.trim_end(), @r"
        Needs attention (combined): 3
          Overdue by 3 days Quarterly review · Critical · work
          Overdue by 1 day  Tithe report · No priority · church
          Today             Call plumber · High · personal
        ");
    }

    #[test]
    fn empty_view_message() {
        let mut output = Vec::new();
        let early = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        run(&mut output, &tasks(), DomainView::Church, &early, false).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Nothing needs attention (church).\n"
        );
    }

    #[test]
    fn json_includes_urgency() {
        let mut output = Vec::new();
        run(&mut output, &tasks(), DomainView::Work, &now(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value[0]["urgency"]["status"], "overdue");
        assert_eq!(value[0]["urgency"]["days"], 3);
        assert_eq!(value.as_array().unwrap().len(), 1);
    }
}
