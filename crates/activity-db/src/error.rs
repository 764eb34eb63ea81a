//! Database error types for activity-db.

use activity_core::StoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A caller-supplied argument was rejected before reaching the database.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidState(_) | DatabaseError::InvalidArgument(_) => {
                Self::Constraint(err.to_string())
            }
            DatabaseError::LibSql(ref e) if e.to_string().contains("constraint failed") => {
                Self::Constraint(err.to_string())
            }
            DatabaseError::Other(e) => Self::Other(e),
            DatabaseError::Query(_)
            | DatabaseError::Migration(_)
            | DatabaseError::NoResult
            | DatabaseError::LibSql(_) => Self::Unavailable(err.to_string()),
        }
    }
}
