//! # activity-db
//!
//! libSQL storage for the activity trail.
//!
//! [`ActivityDb`] owns a local libSQL database holding the `activity_logs`
//! table. It implements [`ActivityStore`](activity_core::ActivityStore) so it
//! can back an `ActivityTracker`, and adds the consumer query surface and
//! retention pruning on top.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
mod store;

use std::path::Path;

use activity_config::DatabaseConfig;
use error::DatabaseError;
use libsql::Builder;

/// Database handle for the activity trail.
pub struct ActivityDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ActivityDb {
    /// Open a local database at the given path. `:memory:` opens a private
    /// in-memory database.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let activity_db = Self { db, conn };
        activity_db.run_migrations().await?;
        tracing::debug!(path, "activity database opened");
        Ok(activity_db)
    }

    /// Open the database described by `config`, creating its parent
    /// directory when needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if !config.is_in_memory() {
            if let Some(parent) = Path::new(&config.path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        DatabaseError::Other(anyhow::anyhow!(
                            "cannot create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }
        Self::open_local(&config.path).await
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
