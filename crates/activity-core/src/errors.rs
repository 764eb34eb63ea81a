//! Cross-cutting error types.
//!
//! Domain-specific errors (`StoreError`, `ConfigError`, `TrackError`,
//! `DatabaseError`) live next to the code that raises them.

use thiserror::Error;

/// Errors that can be raised while handling core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string did not name a known activity event.
    #[error("Unknown activity event: {0}")]
    UnknownEvent(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
