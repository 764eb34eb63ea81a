//! # activity-core
//!
//! Core types shared by every activity-trail crate.
//!
//! This crate provides:
//! - The persisted `ActivityRecord` and its unpersisted form `NewActivity`
//! - `ActivityEvent`, the lifecycle events that can be recorded
//! - `ModelRef`, a polymorphic (type tag + id) reference to subjects and causers
//! - `ActivityFilter`, the composable read-side query
//! - The `ActivityStore` contract and an in-memory implementation
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod filter;
pub mod refs;
pub mod store;

pub use entities::{ActivityRecord, Attributes, NewActivity};
pub use enums::ActivityEvent;
pub use errors::CoreError;
pub use filter::{ActivityFilter, CauserFilter};
pub use refs::ModelRef;
pub use store::{ActivityStore, MemoryStore, StoreError};
