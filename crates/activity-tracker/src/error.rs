//! Tracker error types.

use activity_core::StoreError;
use thiserror::Error;

/// Errors surfaced by [`ActivityTracker::track`](crate::ActivityTracker::track).
///
/// Policy short-circuits are not errors; they return `Ok(None)`.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A subject-supplied hook failed. No default is substituted.
    #[error("Activity hook '{hook}' failed: {source}")]
    Hook {
        hook: &'static str,
        source: anyhow::Error,
    },

    /// The store rejected the write.
    #[error("Failed to persist activity: {0}")]
    Store(#[from] StoreError),
}

impl TrackError {
    pub(crate) fn hook(hook: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Hook { hook, source }
    }
}
