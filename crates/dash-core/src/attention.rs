//! The "needs attention" list: overdue and due-today tasks.
//!
//! Unlike the composed timeline this view keeps overdue tasks, because its
//! whole point is to surface them.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::domain::derive_domain;
use crate::model::{Domain, DomainView, Task};
use crate::priority::priority_rank;

/// Why a task needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Urgency {
    Overdue { days: i64 },
    DueToday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionItem {
    pub task: Task,
    pub due: NaiveDate,
    pub urgency: Urgency,
    pub domain: Domain,
}

impl AttentionItem {
    const fn overdue_days(&self) -> i64 {
        match self.urgency {
            Urgency::Overdue { days } => days,
            Urgency::DueToday => 0,
        }
    }
}

/// Collects incomplete tasks due today or earlier.
///
/// Sorted most overdue first, then by priority rank, then by title.
pub fn needs_attention<Tz: TimeZone>(
    tasks: &[Task],
    view: DomainView,
    now: &DateTime<Tz>,
) -> Vec<AttentionItem> {
    let today = now.date_naive();

    let mut items: Vec<AttentionItem> = tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| {
            let due = task.due_day()?;
            if due > today {
                return None;
            }
            let domain = derive_domain(task);
            if !view.admits(domain) {
                return None;
            }
            let days = (today - due).num_days();
            let urgency = if days == 0 {
                Urgency::DueToday
            } else {
                Urgency::Overdue { days }
            };
            Some(AttentionItem {
                task: task.clone(),
                due,
                urgency,
                domain,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        b.overdue_days()
            .cmp(&a.overdue_days())
            .then_with(|| priority_rank(&a.task.priority).cmp(&priority_rank(&b.task.priority)))
            .then_with(|| a.task.title.cmp(&b.task.title))
    });

    tracing::debug!(view = %view, count = items.len(), "collected tasks needing attention");
    items
}
