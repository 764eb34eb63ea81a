use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ActivityEvent;
use crate::refs::ModelRef;

/// Attribute name to value mapping, used for snapshots, diffs and meta.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A fully assembled activity that has not been persisted yet.
///
/// The tracker builds one of these per tracked mutation; a store turns it
/// into an [`ActivityRecord`] by assigning an id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewActivity {
    pub event: ActivityEvent,
    pub action: Option<String>,
    pub log: String,
    pub description: Option<String>,
    pub subject: ModelRef,
    pub causer: Option<ModelRef>,
    pub properties: Attributes,
    pub meta: Attributes,
    pub batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    /// Attach a store-assigned id. `updated_at` equals `created_at`; records
    /// are never modified after creation.
    #[must_use]
    pub fn into_record(self, id: i64) -> ActivityRecord {
        ActivityRecord {
            id,
            event: self.event,
            action: self.action,
            log: self.log,
            description: self.description,
            subject: self.subject,
            causer: self.causer,
            properties: self.properties,
            meta: self.meta,
            batch_id: self.batch_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// An append-only audit entry describing one mutation of a subject.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityRecord {
    pub id: i64,
    pub event: ActivityEvent,
    pub action: Option<String>,
    pub log: String,
    pub description: Option<String>,
    pub subject: ModelRef,
    pub causer: Option<ModelRef>,
    pub properties: Attributes,
    pub meta: Attributes,
    pub batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
