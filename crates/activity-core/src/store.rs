//! Persistence contract for the activity trail.
//!
//! The tracker only ever appends. Reads go through [`ActivityFilter`], so any
//! store answers the same consumer queries. `activity-db` provides the libSQL
//! implementation; [`MemoryStore`] keeps records in process.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{ActivityRecord, NewActivity};
use crate::filter::ActivityFilter;
use crate::refs::ModelRef;

/// Errors reported by an activity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or opened.
    #[error("Activity store unavailable: {0}")]
    Unavailable(String),

    /// The write was rejected by a store constraint.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Catch-all for backend-specific failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Append-only storage for activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Persist one activity and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails. Callers receive the error
    /// unchanged; stores never retry.
    async fn append(&self, activity: NewActivity) -> Result<ActivityRecord, StoreError>;

    /// Return records matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError>;

    /// The `limit` most recent records for a subject.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    async fn latest_for_subject(
        &self,
        subject: &ModelRef,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        self.query(&ActivityFilter::new().for_subject(subject.clone()).limit(limit))
            .await
    }

    /// Number of records for a subject.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    async fn count_for_subject(&self, subject: &ModelRef) -> Result<u64, StoreError> {
        let records = self
            .query(&ActivityFilter::new().for_subject(subject.clone()))
            .await?;
        Ok(records.len() as u64)
    }

    /// Whether a subject has any recorded activity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    async fn has_activity_for_subject(&self, subject: &ModelRef) -> Result<bool, StoreError> {
        Ok(!self.latest_for_subject(subject, 1).await?.is_empty())
    }
}

/// In-process store. Ids are assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ActivityRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<ActivityRecord> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ActivityRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn append(&self, activity: NewActivity) -> Result<ActivityRecord, StoreError> {
        let mut records = self.lock();
        let id = i64::try_from(records.len() + 1)
            .map_err(|_| StoreError::Constraint("record id overflow".into()))?;
        let record = activity.into_record(id);
        records.push(record.clone());
        Ok(record)
    }

    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut matched: Vec<ActivityRecord> = self
            .lock()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }
}
