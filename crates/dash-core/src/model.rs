//! Calendar events and tasks as the dashboard receives them from the backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventId, TaskId, ValidationError};

/// Classification tag used to split the dashboard into life areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[default]
    Personal,
    Work,
    Church,
}

impl Domain {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Church => "church",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "church" => Ok(Self::Church),
            _ => Err(ValidationError::UnknownDomain {
                value: s.to_string(),
            }),
        }
    }
}

/// The dashboard view a timeline is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainView {
    /// Every domain at once.
    #[default]
    Combined,
    Personal,
    Work,
    Church,
}

impl DomainView {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Church => "church",
        }
    }

    /// The single domain this view is restricted to, if any.
    #[must_use]
    pub const fn domain(&self) -> Option<Domain> {
        match self {
            Self::Combined => None,
            Self::Personal => Some(Domain::Personal),
            Self::Work => Some(Domain::Work),
            Self::Church => Some(Domain::Church),
        }
    }

    /// Returns whether an item of `domain` belongs in this view.
    #[must_use]
    pub fn admits(&self, domain: Domain) -> bool {
        self.domain().is_none_or(|d| d == domain)
    }
}

impl fmt::Display for DomainView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainView {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" | "all" => Ok(Self::Combined),
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "church" => Ok(Self::Church),
            _ => Err(ValidationError::UnknownView {
                value: s.to_string(),
            }),
        }
    }
}

/// A calendar event, already filtered to the relevant window by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    /// Source domain tag assigned by the calendar integration.
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub duration_minutes: i64,
}

impl CalendarEvent {
    /// Calendar day of an all-day event.
    ///
    /// All-day events are stored as midnight UTC of their date, so the date is
    /// read directly instead of being shifted into a local zone.
    #[must_use]
    pub fn all_day_date(&self) -> Option<NaiveDate> {
        self.all_day.then(|| self.start.date_naive())
    }
}

/// A task as returned by the task backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Due date as sent by the backend: `YYYY-MM-DD` or a full timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Priority label (`Critical`, `High`, `Medium`, `Low`).
    #[serde(default)]
    pub priority: String,
    /// Explicit domain, when the user picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    /// Encoded recurrence rule, see [`crate::RecurrenceRule`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

impl Task {
    /// The calendar day the task is due.
    ///
    /// Only the date portion of the due string is read. Parsing the full
    /// timestamp would let a UTC midnight slide into the previous local day.
    #[must_use]
    pub fn due_day(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}
