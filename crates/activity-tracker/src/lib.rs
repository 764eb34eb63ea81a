//! # activity-tracker
//!
//! The change-tracking decision engine.
//!
//! Given a mutated subject and the event that happened to it, the tracker
//! decides whether the event is worth recording, computes the attribute diff,
//! resolves causer, batch and labels, and appends one immutable record to an
//! [`ActivityStore`](activity_core::ActivityStore).
//!
//! - [`context`]: per-unit-of-work state and the batch / disable scopes
//! - [`changes`]: attribute diffing and ignore sets
//! - [`policy`]: the trackability gate
//! - [`labels`]: action, log and description resolution
//! - [`batch`]: batch id resolution
//! - [`tracker`]: the orchestrator
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use activity_config::TrackingConfig;
//! use activity_core::{Attributes, MemoryStore};
//! use activity_tracker::{ActivityContext, ActivityTracker, Trackable};
//!
//! struct Post {
//!     id: u64,
//!     title: String,
//! }
//!
//! impl Trackable for Post {
//!     fn subject_type(&self) -> &str {
//!         "blog::Post"
//!     }
//!     fn subject_id(&self) -> u64 {
//!         self.id
//!     }
//!     fn attributes(&self) -> Attributes {
//!         let mut attrs = Attributes::new();
//!         attrs.insert("title".into(), self.title.clone().into());
//!         attrs
//!     }
//! }
//!
//! # async fn example() -> Result<(), activity_tracker::TrackError> {
//! let tracker = ActivityTracker::new(Arc::new(MemoryStore::new()), TrackingConfig::default());
//! let mut ctx = ActivityContext::new();
//! let post = Post { id: 1, title: "Hello".into() };
//!
//! let mut batch = ctx.batch();
//! tracker.created(&mut batch, &post).await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod changes;
pub mod context;
pub mod error;
pub mod labels;
pub mod policy;
pub mod trackable;
pub mod tracker;

pub use changes::{AttributeChange, Changes, IgnoreSet};
pub use context::{ActivityContext, BatchScope, LoggingDisabled, RequestInfo};
pub use error::TrackError;
pub use trackable::Trackable;
pub use tracker::ActivityTracker;
