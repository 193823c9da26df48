//! Recur command: expand a recurrence rule into dates.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dash_core::RecurrenceRule;
use dash_core::format::due_label;

pub fn run<W: Write>(
    writer: &mut W,
    rule: &str,
    from: NaiveDate,
    today: NaiveDate,
    count: usize,
) -> Result<()> {
    let rule: RecurrenceRule = rule
        .parse()
        .with_context(|| format!("invalid recurrence rule: {rule}"))?;

    writeln!(writer, "{rule}")?;
    let mut listed = 0;
    for date in rule.occurrences(from, count) {
        writeln!(
            writer,
            "  {}  {}  {}",
            date,
            date.format("%a"),
            due_label(date, today)
        )?;
        listed += 1;
    }
    if listed == 0 {
        writeln!(writer, "  no further occurrences")?;
    }
    Ok(())
}
