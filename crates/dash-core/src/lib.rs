//! Core logic for the productivity dashboard.
//!
//! This crate contains the pieces of the dashboard that are more than view
//! glue:
//! - Timeline: merging calendar events and tasks into one day-grouped view
//! - Session: the two-stage inactivity warning and logout monitor
//! - Supporting lookups: domain derivation, priority ranks, recurrence rules

mod attention;
pub mod clock;
mod domain;
pub mod format;
mod model;
mod priority;
mod recurrence;
pub mod session;
mod timeline;
pub mod timer;
mod types;

pub use attention::{AttentionItem, Urgency, needs_attention};
pub use clock::{Clock, FixedClock, InstantClock, ManualClock, MonotonicClock, SystemClock};
pub use domain::derive_domain;
pub use model::{CalendarEvent, Domain, DomainView, Task};
pub use priority::{Priority, UNRANKED, UnknownPriority, priority_rank};
pub use recurrence::{Frequency, RecurrenceError, RecurrenceRule};
pub use session::{
    ActivityKind, LogoutError, SessionConfig, SessionEvent, SessionMonitor, SessionPhase,
    SessionState, UnknownActivityKind,
};
pub use timeline::{
    ComposedTimeline, DayBucket, TimelineComposer, TimelineEntry, TimelineItem, TimelineQuery,
    compose, group_by_day,
};
pub use types::{EventId, TaskId, ValidationError};
