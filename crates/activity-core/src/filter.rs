//! Composable read-side filter over activity records.
//!
//! Every populated field narrows the result set (logical AND). The same
//! filter drives the SQL query in `activity-db` and the in-memory evaluation
//! in [`MemoryStore`](crate::store::MemoryStore).

use chrono::{DateTime, Utc};

use crate::entities::ActivityRecord;
use crate::enums::ActivityEvent;
use crate::refs::ModelRef;

/// Causer criterion for [`ActivityFilter::caused_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CauserFilter {
    /// Only records without a causer (system or unauthenticated changes).
    Nobody,
    /// Only records caused by the given model.
    Model(ModelRef),
}

/// Filter criteria for activity queries. Results are ordered newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub event: Option<ActivityEvent>,
    pub subject: Option<ModelRef>,
    pub batch_id: Option<String>,
    pub causer: Option<CauserFilter>,
    pub log: Option<String>,
    pub action: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl ActivityFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_event(mut self, event: ActivityEvent) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn for_subject(mut self, subject: ModelRef) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn in_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// `None` selects records without a causer.
    #[must_use]
    pub fn caused_by(mut self, causer: Option<ModelRef>) -> Self {
        self.causer = Some(causer.map_or(CauserFilter::Nobody, CauserFilter::Model));
        self
    }

    #[must_use]
    pub fn in_log(mut self, log: impl Into<String>) -> Self {
        self.log = Some(log.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Restrict to records created within `[from, to]`.
    #[must_use]
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate every criterion except `limit` against a single record.
    #[must_use]
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        if self.event.is_some_and(|e| e != record.event) {
            return false;
        }
        if self.subject.as_ref().is_some_and(|s| *s != record.subject) {
            return false;
        }
        if let Some(ref batch_id) = self.batch_id {
            if record.batch_id.as_deref() != Some(batch_id.as_str()) {
                return false;
            }
        }
        match self.causer {
            Some(CauserFilter::Nobody) if record.causer.is_some() => return false,
            Some(CauserFilter::Model(ref causer)) if record.causer.as_ref() != Some(causer) => {
                return false;
            }
            _ => {}
        }
        if self.log.as_ref().is_some_and(|l| *l != record.log) {
            return false;
        }
        if let Some(ref action) = self.action {
            if record.action.as_deref() != Some(action.as_str()) {
                return false;
            }
        }
        if self.created_from.is_some_and(|from| record.created_at < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| record.created_at > to) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::entities::Attributes;

    fn record(event: ActivityEvent, causer: Option<ModelRef>) -> ActivityRecord {
        let now = Utc::now();
        ActivityRecord {
            id: 1,
            event,
            action: Some("invoice_issued".into()),
            log: "invoices".into(),
            description: Some("Invoice created".into()),
            subject: ModelRef::new("billing::Invoice", 10),
            causer,
            properties: Attributes::new(),
            meta: Attributes::new(),
            batch_id: Some("batch-1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ActivityFilter::new().matches(&record(ActivityEvent::Created, None)));
    }

    #[test]
    fn criteria_compose() {
        let r = record(ActivityEvent::Created, Some(ModelRef::new("app::User", 1)));
        let filter = ActivityFilter::new()
            .for_event(ActivityEvent::Created)
            .for_subject(ModelRef::new("billing::Invoice", 10))
            .in_batch("batch-1")
            .in_log("invoices")
            .with_action("invoice_issued");
        assert!(filter.matches(&r));
        assert!(!filter.clone().in_log("default").matches(&r));
        assert!(!filter.for_event(ActivityEvent::Deleted).matches(&r));
    }

    #[test]
    fn caused_by_none_selects_causerless_records() {
        let anonymous = record(ActivityEvent::Updated, None);
        let attributed = record(ActivityEvent::Updated, Some(ModelRef::new("app::User", 2)));
        let nobody = ActivityFilter::new().caused_by(None);
        assert!(nobody.matches(&anonymous));
        assert!(!nobody.matches(&attributed));

        let user = ActivityFilter::new().caused_by(Some(ModelRef::new("app::User", 2)));
        assert!(user.matches(&attributed));
        assert!(!user.matches(&anonymous));
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = record(ActivityEvent::Created, None);
        let at = r.created_at;
        assert!(ActivityFilter::new().between(at, at).matches(&r));
        assert!(
            !ActivityFilter::new()
                .between(at + Duration::seconds(1), at + Duration::days(1))
                .matches(&r)
        );
    }
}
