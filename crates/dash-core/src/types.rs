//! Identifiers and validation errors shared by the dashboard model.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A backend identifier was empty or only whitespace.
    #[error("{kind} ID cannot be blank")]
    BlankId { kind: &'static str },

    /// The value does not name a known domain.
    #[error("unknown domain: {value}")]
    UnknownDomain { value: String },

    /// The value does not name a known timeline view.
    #[error("unknown view: {value} (expected combined, personal, work or church)")]
    UnknownView { value: String },
}

/// Declares an opaque identifier assigned by one of the backends.
///
/// Surrounding whitespace is trimmed; blank IDs are rejected both from code
/// and when deserializing a snapshot.
macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
                let raw = raw.into();
                match raw.trim() {
                    "" => Err(ValidationError::BlankId { kind: $kind }),
                    trimmed if trimmed.len() == raw.len() => Ok(Self(raw)),
                    trimmed => Ok(Self(trimmed.to_string())),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

backend_id!(
    /// Calendar event ID as issued by the calendar integration.
    EventId => "event"
);

backend_id!(
    /// Task ID as issued by the task backend.
    TaskId => "task"
);
