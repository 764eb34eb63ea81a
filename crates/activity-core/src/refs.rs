//! Polymorphic references to subjects and causers.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A (type tag, id) pair pointing at a record owned by the host application.
///
/// Used for both the subject of an activity and its causer. The tag is
/// opaque to the trail; by convention it is a path such as `billing::Invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ModelRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
}

impl ModelRef {
    #[must_use]
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// The last path segment of the type tag (`billing::Invoice` -> `Invoice`).
    #[must_use]
    pub fn base_name(&self) -> &str {
        type_base_name(&self.kind)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Strip module/namespace qualifiers from a type tag.
///
/// Accepts `::`, `\` and `.` as separators.
#[must_use]
pub fn type_base_name(tag: &str) -> &str {
    tag.rsplit([':', '\\', '.']).next().unwrap_or(tag)
}
