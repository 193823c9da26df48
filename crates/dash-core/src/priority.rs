//! Task priority labels and their sort ranks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rank given to labels missing from the priority table. Sorts after every
/// known priority.
pub const UNRANKED: u8 = 4;

/// Known task priorities, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Sort rank; lower ranks come first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for labels outside the priority table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownPriority(s.to_string()))
    }
}

/// Looks up the sort rank of a priority label. Unknown labels rank last.
pub fn priority_rank(label: &str) -> u8 {
    label.parse::<Priority>().map_or(UNRANKED, Priority::rank)
}
