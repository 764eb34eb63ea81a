//! [`ActivityStore`] implementation backed by libSQL.

use activity_core::{ActivityFilter, ActivityRecord, ActivityStore, ModelRef, NewActivity, StoreError};
use async_trait::async_trait;

use crate::ActivityDb;

#[async_trait]
impl ActivityStore for ActivityDb {
    async fn append(&self, activity: NewActivity) -> Result<ActivityRecord, StoreError> {
        Ok(self.insert_activity(activity).await?)
    }

    async fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        Ok(self.query_activities(filter).await?)
    }

    async fn count_for_subject(&self, subject: &ModelRef) -> Result<u64, StoreError> {
        let filter = ActivityFilter::new().for_subject(subject.clone());
        Ok(self.count_activities(&filter).await?)
    }

    async fn has_activity_for_subject(&self, subject: &ModelRef) -> Result<bool, StoreError> {
        Ok(self.subject_has_activity(subject).await?)
    }
}
