//! Unified timeline of calendar events and tasks.
//!
//! # Ordering
//!
//! 1. Calendar day (`date_key`) ascending
//! 2. Events before tasks within a day
//! 3. Events by start instant, tasks by priority rank
//!
//! Ties keep input order. Each item's `date_key` is computed once, when the
//! item is built, and is the only value used for both sorting and grouping.

use std::cmp::Ordering;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::clock::{Clock, local_midnight};
use crate::domain::derive_domain;
use crate::model::{CalendarEvent, Domain, DomainView, Task};
use crate::priority::priority_rank;

/// Which slice of the timeline to compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineQuery {
    pub view: DomainView,
    /// Inclusive forward window from today, in days.
    pub horizon_days: u32,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            view: DomainView::Combined,
            horizon_days: 7,
        }
    }
}

/// The source record behind a timeline item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Event { event: CalendarEvent },
    Task { task: Task },
}

/// One row of a composed timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineItem {
    #[serde(flatten)]
    pub entry: TimelineEntry,
    pub title: String,
    pub date_key: NaiveDate,
    pub sort_instant: DateTime<Utc>,
    /// 0 for events; the priority rank for tasks.
    pub sort_priority: u8,
    pub domain: Domain,
}

impl TimelineItem {
    fn from_event<Tz: TimeZone>(event: &CalendarEvent, tz: &Tz) -> Self {
        let date_key = event
            .all_day_date()
            .unwrap_or_else(|| event.start.with_timezone(tz).date_naive());
        Self {
            entry: TimelineEntry::Event {
                event: event.clone(),
            },
            title: event.title.clone(),
            date_key,
            sort_instant: event.start,
            sort_priority: 0,
            domain: event.domain,
        }
    }

    fn from_task<Tz: TimeZone>(task: &Task, due: NaiveDate, domain: Domain, tz: &Tz) -> Self {
        Self {
            entry: TimelineEntry::Task { task: task.clone() },
            title: task.title.clone(),
            date_key: due,
            sort_instant: local_midnight(tz, due),
            sort_priority: priority_rank(&task.priority),
            domain,
        }
    }

    pub const fn is_event(&self) -> bool {
        matches!(self.entry, TimelineEntry::Event { .. })
    }

    const fn kind_rank(&self) -> u8 {
        if self.is_event() { 0 } else { 1 }
    }

    fn timeline_cmp(&self, other: &Self) -> Ordering {
        self.date_key
            .cmp(&other.date_key)
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
            .then_with(|| {
                if self.is_event() && other.is_event() {
                    self.sort_instant.cmp(&other.sort_instant)
                } else {
                    self.sort_priority.cmp(&other.sort_priority)
                }
            })
    }
}

/// Items sharing one calendar day, in timeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub items: Vec<TimelineItem>,
}

/// Merges events and tasks into one ordered timeline as of `now`.
///
/// Events are taken as-is; the caller has already narrowed them to the
/// visible window and domain. Tasks are dropped when they have no usable due
/// date, are due before today or after `today + horizon_days`, or belong to a
/// domain outside `query.view`. Overdue tasks are intentionally left out here;
/// see [`crate::needs_attention`] for the view that shows them.
pub fn compose<Tz: TimeZone>(
    events: &[CalendarEvent],
    tasks: &[Task],
    query: &TimelineQuery,
    now: &DateTime<Tz>,
) -> Vec<TimelineItem> {
    let tz = now.timezone();
    let today = now.date_naive();
    let last_day = today
        .checked_add_days(Days::new(u64::from(query.horizon_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut items: Vec<TimelineItem> = events
        .iter()
        .map(|event| TimelineItem::from_event(event, &tz))
        .collect();

    let mut undated = 0usize;
    let mut out_of_window = 0usize;
    let mut other_domain = 0usize;
    for task in tasks {
        let Some(due) = task.due_day() else {
            undated += 1;
            continue;
        };
        if due < today || due > last_day {
            out_of_window += 1;
            continue;
        }
        let domain = derive_domain(task);
        if !query.view.admits(domain) {
            other_domain += 1;
            continue;
        }
        items.push(TimelineItem::from_task(task, due, domain, &tz));
    }

    items.sort_by(TimelineItem::timeline_cmp);

    tracing::debug!(
        view = %query.view,
        horizon_days = query.horizon_days,
        events = events.len(),
        tasks = tasks.len(),
        undated,
        out_of_window,
        other_domain,
        composed = items.len(),
        "composed timeline"
    );

    items
}

/// Splits a composed timeline into per-day buckets, keeping order.
pub fn group_by_day(items: Vec<TimelineItem>) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();
    for item in items {
        match buckets.last_mut() {
            Some(bucket) if bucket.date == item.date_key => bucket.items.push(item),
            _ => buckets.push(DayBucket {
                date: item.date_key,
                items: vec![item],
            }),
        }
    }
    buckets
}

/// A day-grouped timeline and the instant it was composed at.
#[derive(Debug, Clone)]
pub struct ComposedTimeline<Tz: TimeZone> {
    pub now: DateTime<Tz>,
    pub days: Vec<DayBucket>,
}

/// Composes timelines against an injected clock.
#[derive(Debug, Clone)]
pub struct TimelineComposer<C> {
    clock: C,
}

impl<C: Clock> TimelineComposer<C> {
    pub const fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn compose(
        &self,
        events: &[CalendarEvent],
        tasks: &[Task],
        query: &TimelineQuery,
    ) -> Vec<TimelineItem> {
        compose(events, tasks, query, &self.clock.now())
    }

    /// Composes and groups in one step, reading the clock once.
    pub fn compose_days(
        &self,
        events: &[CalendarEvent],
        tasks: &[Task],
        query: &TimelineQuery,
    ) -> ComposedTimeline<C::Tz> {
        let now = self.clock.now();
        let days = group_by_day(compose(events, tasks, query, &now));
        ComposedTimeline { now, days }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use chrono::FixedOffset;
    use insta::assert_snapshot;

    use super::*;
    use crate::clock::FixedClock;
    use crate::types::{EventId, TaskId};

    fn pacific() -> FixedOffset {
        FixedOffset::west_opt(7 * 3600).unwrap()
    }

    fn october(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    /// 2026-10-19 14:00 at UTC-7.
    fn now() -> DateTime<FixedOffset> {
        pacific().with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap()
    }

    fn event(id: &str, start: &str, domain: Domain) -> CalendarEvent {
        let start: DateTime<Utc> = start.parse().unwrap();
        CalendarEvent {
            id: EventId::new(id).unwrap(),
            title: id.to_string(),
            start,
            end: start + chrono::Duration::hours(1),
            all_day: false,
            domain,
            duration_minutes: 60,
        }
    }

    fn task(id: &str, due: Option<&str>, priority: &str) -> Task {
        Task {
            id: TaskId::new(id).unwrap(),
            title: id.to_string(),
            due_date: due.map(String::from),
            priority: priority.to_string(),
            domain: None,
            category: None,
            labels: Vec::new(),
            completed: false,
            recurrence: None,
        }
    }

    fn in_domain(mut task: Task, domain: &str) -> Task {
        task.domain = Some(domain.to_string());
        task
    }

    fn titles(items: &[TimelineItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn events_precede_tasks_ordered_by_priority() {
        let events = [event("standup", "2026-10-20T17:00:00Z", Domain::Work)];
        let tasks = [
            task("low", Some("2026-10-20"), "Low"),
            task("critical", Some("2026-10-20"), "Critical"),
        ];

        let items = compose(&events, &tasks, &TimelineQuery::default(), &now());

        assert_eq!(titles(&items), vec!["standup", "critical", "low"]);
        assert!(items.iter().all(|i| i.date_key == october(20)));
        assert_eq!(group_by_day(items).len(), 1);
    }

    #[test]
    fn tasks_without_usable_due_date_are_dropped() {
        let tasks = [
            task("none", None, "High"),
            task("garbage", Some("soon"), "High"),
            task("dated", Some("2026-10-21"), "High"),
        ];
        let items = compose(&[], &tasks, &TimelineQuery::default(), &now());
        assert_eq!(titles(&items), vec!["dated"]);
    }

    #[test]
    fn horizon_is_inclusive_at_both_ends() {
        let tasks = [
            task("yesterday", Some("2026-10-18"), "High"),
            task("today", Some("2026-10-19"), "High"),
            task("last-day", Some("2026-10-26"), "High"),
            task("past-horizon", Some("2026-10-27"), "High"),
        ];
        let items = compose(&[], &tasks, &TimelineQuery::default(), &now());
        assert_eq!(titles(&items), vec!["today", "last-day"]);
    }

    #[test]
    fn zero_horizon_keeps_only_today() {
        let tasks = [
            task("today", Some("2026-10-19T09:00:00Z"), "Low"),
            task("tomorrow", Some("2026-10-20"), "Low"),
        ];
        let query = TimelineQuery {
            view: DomainView::Combined,
            horizon_days: 0,
        };
        assert_eq!(titles(&compose(&[], &tasks, &query, &now())), vec!["today"]);
    }

    #[test]
    fn domain_view_filters_tasks_but_not_events() {
        let events = [event("service", "2026-10-20T16:00:00Z", Domain::Church)];
        let tasks = [
            in_domain(task("report", Some("2026-10-20"), "High"), "work"),
            in_domain(task("hymns", Some("2026-10-20"), "High"), "church"),
            task("groceries", Some("2026-10-20"), "High"),
        ];
        let work = TimelineQuery {
            view: DomainView::Work,
            horizon_days: 7,
        };

        let items = compose(&events, &tasks, &work, &now());
        assert_eq!(titles(&items), vec!["service", "report"]);

        let combined = compose(&events, &tasks, &TimelineQuery::default(), &now());
        assert_eq!(combined.len(), 4);
    }

    #[test]
    fn events_sort_by_start_within_a_day() {
        let events = [
            event("late", "2026-10-21T01:00:00Z", Domain::Personal),
            event("early", "2026-10-20T15:00:00Z", Domain::Personal),
        ];
        let items = compose(&events, &[], &TimelineQuery::default(), &now());
        assert_eq!(titles(&items), vec!["early", "late"]);
        // 01:00Z on the 21st is still the evening of the 20th at UTC-7.
        assert!(items.iter().all(|i| i.date_key == october(20)));
    }

    #[test]
    fn utc_midnight_due_date_stays_on_its_date() {
        let tasks = [task("filing", Some("2026-10-22T00:00:00Z"), "Medium")];
        let items = compose(&[], &tasks, &TimelineQuery::default(), &now());
        assert_eq!(items[0].date_key, october(22));
        assert_eq!(items[0].sort_instant.to_rfc3339(), "2026-10-22T07:00:00+00:00");
    }

    #[test]
    fn all_day_events_use_their_calendar_date() {
        let mut holiday = event("holiday", "2026-10-21T00:00:00Z", Domain::Personal);
        holiday.all_day = true;
        let items = compose(&[holiday], &[], &TimelineQuery::default(), &now());
        assert_eq!(items[0].date_key, october(21));
    }

    #[test]
    fn equal_priority_tasks_keep_input_order() {
        let tasks = [
            task("b", Some("2026-10-20"), "High"),
            task("a", Some("2026-10-20"), "High"),
            task("unknown", Some("2026-10-20"), "whenever"),
            task("c", Some("2026-10-20"), "high"),
        ];
        let items = compose(&[], &tasks, &TimelineQuery::default(), &now());
        assert_eq!(titles(&items), vec!["b", "a", "c", "unknown"]);
    }

    #[test]
    fn composing_twice_is_identical() {
        let events = [
            event("one", "2026-10-22T18:00:00Z", Domain::Work),
            event("two", "2026-10-20T18:00:00Z", Domain::Work),
        ];
        let tasks = [
            task("x", Some("2026-10-22"), "Low"),
            task("y", Some("2026-10-20"), "Critical"),
        ];
        let first = compose(&events, &tasks, &TimelineQuery::default(), &now());
        let second = compose(&events, &tasks, &TimelineQuery::default(), &now());
        assert_eq!(first, second);
    }

    #[test]
    fn composer_uses_injected_clock() {
        let composer = TimelineComposer::new(FixedClock(now()));
        let events = [
            event("retro", "2026-10-23T20:00:00Z", Domain::Work),
            event("dentist", "2026-10-20T16:30:00Z", Domain::Personal),
        ];
        let tasks = [
            in_domain(task("slides", Some("2026-10-23"), "High"), "work"),
            task("call mom", Some("2026-10-20"), "Medium"),
            task("taxes", Some("2026-10-19"), "Critical"),
            task("stale", Some("2026-10-01"), "Critical"),
        ];

        let composed = composer.compose_days(&events, &tasks, &TimelineQuery::default());
        assert_eq!(composed.now, now());
        let days = composed.days;

        let mut out = String::new();
        for day in &days {
            writeln!(out, "{}", day.date).unwrap();
            for item in &day.items {
                let kind = if item.is_event() { "event" } else { "task" };
                writeln!(out, "  {kind} {} ({})", item.title, item.domain).unwrap();
            }
        }
        assert_snapshot!(out.trim_end(), @r"
        2026-10-19
          task taxes (personal)
        2026-10-20
          event dentist (personal)
          task call mom (personal)
        2026-10-23
          event retro (work)
          task slides (work)
        ");
    }

    #[test]
    fn item_serializes_with_kind_tag() {
        let tasks = [task("t", Some("2026-10-20"), "Low")];
        let items = compose(&[], &tasks, &TimelineQuery::default(), &now());
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["kind"], "task");
        assert_eq!(json["task"]["id"], "t");
        assert_eq!(json["date_key"], "2026-10-20");
        assert_eq!(json["sort_priority"], 3);
    }
}
