//! The tracker writing through the libSQL store.

use std::sync::Arc;

use activity_config::ActivityConfig;
use activity_core::{ActivityEvent, ActivityFilter, ActivityStore, Attributes, ModelRef, StoreError};
use activity_db::ActivityDb;
use activity_tracker::{ActivityContext, ActivityTracker, RequestInfo, TrackError, Trackable};
use pretty_assertions::assert_eq;
use serde_json::json;

struct Order {
    id: u64,
    before: Attributes,
    after: Attributes,
}

impl Order {
    fn new(id: u64, status: &str) -> Self {
        let mut attrs = Attributes::new();
        attrs.insert("status".into(), json!(status));
        attrs.insert("updated_at".into(), json!("2024-01-01T00:00:00Z"));
        Self {
            id,
            before: attrs.clone(),
            after: attrs,
        }
    }

    fn set_status(&mut self, status: &str) {
        self.before = self.after.clone();
        self.after.insert("status".into(), json!(status));
        self.after
            .insert("updated_at".into(), json!("2024-01-02T00:00:00Z"));
    }
}

impl Trackable for Order {
    fn subject_type(&self) -> &str {
        "shop::Order"
    }

    fn subject_id(&self) -> u64 {
        self.id
    }

    fn attributes(&self) -> Attributes {
        self.after.clone()
    }

    fn original_attributes(&self) -> Attributes {
        self.before.clone()
    }

    fn activity_action(&self, event: ActivityEvent) -> anyhow::Result<Option<String>> {
        Ok((event == ActivityEvent::Updated).then(|| "status_changed".to_string()))
    }
}

async fn tracker() -> (ActivityTracker, Arc<ActivityDb>) {
    let config = ActivityConfig::default();
    let db = Arc::new(ActivityDb::open(&activity_config::DatabaseConfig {
        path: ":memory:".into(),
    })
    .await
    .unwrap());
    (ActivityTracker::new(db.clone(), config.tracking), db)
}

#[tokio::test]
async fn order_lifecycle_is_recorded() {
    let (tracker, db) = tracker().await;
    let mut ctx = ActivityContext::for_request(RequestInfo::new("PATCH").with_host("shop.test"))
        .authenticated_as(ModelRef::new("auth::User", 4));
    let mut order = Order::new(10, "pending");

    {
        let mut batch = ctx.batch();
        tracker.created(&mut batch, &order).await.unwrap().unwrap();
        order.set_status("paid");
        tracker.updated(&mut batch, &order).await.unwrap().unwrap();
    }
    tracker.deleted(&mut ctx, &order).await.unwrap().unwrap();

    let history = db
        .query(&ActivityFilter::new().for_subject(order.subject()))
        .await
        .unwrap();
    let events: Vec<_> = history.iter().map(|r| r.event).collect();
    assert_eq!(
        events,
        vec![
            ActivityEvent::Deleted,
            ActivityEvent::Updated,
            ActivityEvent::Created
        ]
    );

    let updated = &history[1];
    assert_eq!(updated.action.as_deref(), Some("status_changed"));
    assert_eq!(updated.description.as_deref(), Some("Order updated"));
    assert_eq!(
        serde_json::Value::Object(updated.properties.clone()),
        json!({ "status": { "old": "pending", "new": "paid" } })
    );
    assert_eq!(updated.causer, Some(ModelRef::new("auth::User", 4)));
    assert!(updated.batch_id.is_some());
    assert_eq!(updated.batch_id, history[2].batch_id);
    assert_eq!(history[0].batch_id, None);
    assert!(updated.meta.is_empty());
}

#[tokio::test]
async fn timestamp_only_update_is_not_recorded() {
    let (tracker, db) = tracker().await;
    let mut ctx = ActivityContext::new();
    let mut order = Order::new(11, "pending");
    order.set_status("pending");

    assert!(tracker.updated(&mut ctx, &order).await.unwrap().is_none());
    assert!(!db.has_activity_for_subject(&order.subject()).await.unwrap());
}

#[tokio::test]
async fn store_rejection_surfaces_as_track_error() {
    let (tracker, _db) = tracker().await;
    let mut ctx = ActivityContext::new();
    let order = Order::new(u64::MAX, "pending");

    let err = tracker.created(&mut ctx, &order).await.unwrap_err();

    assert!(matches!(err, TrackError::Store(StoreError::Constraint(_))));
}
