//! Record structs for the activity trail.
//!
//! Each persisted record maps to a row of the `activity_logs` table. All
//! structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod activity;

pub use activity::{ActivityRecord, Attributes, NewActivity};
