//! Lifecycle events recorded by the activity trail.
//!
//! Events serialize as `snake_case` strings, which is also the form stored in
//! the `event` column.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

/// A mutation event on a tracked record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEvent {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl ActivityEvent {
    /// Every event, in lifecycle order. This is the default trackable set.
    pub const ALL: [Self; 4] = [Self::Created, Self::Updated, Self::Deleted, Self::Restored];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityEvent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| CoreError::UnknownEvent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde() {
        for event in ActivityEvent::ALL {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json, serde_json::Value::String(event.as_str().to_string()));
        }
    }

    #[test]
    fn parses_known_events() {
        assert_eq!("restored".parse::<ActivityEvent>().unwrap(), ActivityEvent::Restored);
        assert_eq!(ActivityEvent::Updated.to_string(), "updated");
    }

    #[test]
    fn rejects_unknown_event() {
        let err = "archived".parse::<ActivityEvent>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownEvent(ref s) if s == "archived"));
    }
}
