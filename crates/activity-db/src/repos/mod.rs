//! Repository methods on [`ActivityDb`](crate::ActivityDb).
//!
//! Each module adds methods via `impl ActivityDb` blocks.

pub mod activity;
pub mod retention;
