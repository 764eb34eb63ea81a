//! Retention pruning for `activity_logs`.

use activity_config::RetentionConfig;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::ActivityDb;
use crate::error::DatabaseError;
use crate::helpers::format_datetime;

impl ActivityDb {
    /// Delete every activity created strictly before `cutoff`.
    ///
    /// Returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM activity_logs WHERE created_at < ?1",
                [format_datetime(&cutoff)],
            )
            .await?;
        info!(deleted, cutoff = %cutoff, "pruned activity logs");
        Ok(deleted)
    }

    /// Delete activities older than `days` days.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidArgument` if `days` is zero or reaches
    /// past the earliest representable date, otherwise
    /// see [`Self::prune_before`].
    pub async fn prune_older_than_days(&self, days: u32) -> Result<u64, DatabaseError> {
        if days == 0 {
            return Err(DatabaseError::InvalidArgument(
                "retention days must be a positive integer".into(),
            ));
        }
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                DatabaseError::InvalidArgument(format!(
                    "retention of {days} days is outside the supported date range"
                ))
            })?;
        self.prune_before(cutoff).await
    }

    /// Apply the configured retention window.
    ///
    /// # Errors
    ///
    /// See [`Self::prune_older_than_days`].
    pub async fn prune_expired(&self, retention: &RetentionConfig) -> Result<u64, DatabaseError> {
        self.prune_older_than_days(retention.keep_days).await
    }
}
