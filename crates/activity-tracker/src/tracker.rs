//! The activity tracker: gates, assembles and persists one record per event.
//!
//! Every call to [`ActivityTracker::track`] follows this pipeline:
//! 1. `updated` events with no meaningful change are dropped
//! 2. The trackability policy is consulted
//! 3. Causer and request meta are captured into the context
//! 4. Labels, properties and batch id are resolved
//! 5. The record is appended to the store
//! 6. The context is flushed
//!
//! Steps 1 and 2 short-circuit with `Ok(None)`. The context is flushed after
//! step 3 whether or not the write succeeds.

use std::sync::Arc;

use activity_config::TrackingConfig;
use activity_core::{ActivityEvent, ActivityRecord, ActivityStore, Attributes, NewActivity};
use chrono::Utc;
use tracing::{debug, warn};

use crate::batch::resolve_batch_id;
use crate::changes::{Changes, IgnoreSet, changes_to_properties, diff};
use crate::context::ActivityContext;
use crate::error::TrackError;
use crate::labels::resolve_labels;
use crate::policy;
use crate::trackable::Trackable;

pub struct ActivityTracker {
    store: Arc<dyn ActivityStore>,
    config: TrackingConfig,
}

impl ActivityTracker {
    pub fn new(store: Arc<dyn ActivityStore>, config: TrackingConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub const fn config(&self) -> &TrackingConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<dyn ActivityStore> {
        &self.store
    }

    /// Ignore set in effect for `subject` (global ∪ subject-declared).
    pub fn ignored_attributes<T: Trackable + ?Sized>(&self, subject: &T) -> IgnoreSet {
        IgnoreSet::for_subject(&self.config, subject)
    }

    pub fn is_tracked<T: Trackable + ?Sized>(
        &self,
        ctx: &ActivityContext,
        subject: &T,
        event: ActivityEvent,
    ) -> bool {
        policy::is_tracked(&self.config, ctx, subject, event)
    }

    /// Record `event` on `subject`.
    ///
    /// `attribute_override` replaces the attribute snapshot stored for
    /// `created` events. Returns the stored record, or `None` when the event
    /// was filtered out.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::Hook` if a subject hook fails and
    /// `TrackError::Store` if the write fails.
    pub async fn track<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
        event: ActivityEvent,
        attribute_override: Option<Attributes>,
    ) -> Result<Option<ActivityRecord>, TrackError> {
        let changes = if event == ActivityEvent::Updated {
            let ignored = self.ignored_attributes(subject);
            let changes = diff(&subject.original_attributes(), &subject.attributes(), &ignored);
            if changes.is_empty() {
                debug!(subject = %subject.subject(), "no meaningful changes, skipping activity");
                return Ok(None);
            }
            Some(changes)
        } else {
            None
        };

        if !self.is_tracked(ctx, subject, event) {
            debug!(subject = %subject.subject(), %event, "event not tracked, skipping activity");
            return Ok(None);
        }

        self.capture_ambient(ctx);
        let result = self
            .record(ctx, subject, event, changes, attribute_override)
            .await;
        ctx.flush();
        result.map(Some)
    }

    /// Record a `created` event.
    ///
    /// The `created`, `updated`, `deleted` and `restored` entry points are
    /// meant to be called from the matching lifecycle hook of the host.
    ///
    /// # Errors
    ///
    /// See [`Self::track`].
    pub async fn created<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
    ) -> Result<Option<ActivityRecord>, TrackError> {
        self.track(ctx, subject, ActivityEvent::Created, None).await
    }

    /// Record a `updated` event.
    ///
    /// # Errors
    ///
    /// See [`Self::track`].
    pub async fn updated<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
    ) -> Result<Option<ActivityRecord>, TrackError> {
        self.track(ctx, subject, ActivityEvent::Updated, None).await
    }

    /// Record a `deleted` event.
    ///
    /// # Errors
    ///
    /// See [`Self::track`].
    pub async fn deleted<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
    ) -> Result<Option<ActivityRecord>, TrackError> {
        self.track(ctx, subject, ActivityEvent::Deleted, None).await
    }

    /// Record a `restored` event.
    ///
    /// # Errors
    ///
    /// See [`Self::track`].
    pub async fn restored<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
    ) -> Result<Option<ActivityRecord>, TrackError> {
        self.track(ctx, subject, ActivityEvent::Restored, None).await
    }

    fn capture_ambient(&self, ctx: &mut ActivityContext) {
        if self.config.capture_causer {
            if let Some(actor) = ctx.actor().cloned() {
                ctx.set_causer(Some(actor));
            }
        }

        let Some(request) = ctx.request().cloned() else {
            return;
        };

        if self.config.capture_request_meta {
            let mut meta = Attributes::new();
            if !request.method.is_empty() {
                meta.insert("method".into(), request.method.into());
            }
            if let Some(host) = request.host.filter(|h| !h.is_empty()) {
                meta.insert("host".into(), host.into());
            }
            ctx.add_meta(meta);
        }

        if self.config.capture_ip {
            if let Some(ip) = request.ip {
                ctx.insert_meta("ip", ip);
            }
        }
    }

    async fn record<T: Trackable + ?Sized>(
        &self,
        ctx: &mut ActivityContext,
        subject: &T,
        event: ActivityEvent,
        changes: Option<Changes>,
        attribute_override: Option<Attributes>,
    ) -> Result<ActivityRecord, TrackError> {
        let labels = resolve_labels(subject, event, &self.config.default_log)?;
        let properties = Self::properties(subject, event, changes, attribute_override)?;
        let batch_id = resolve_batch_id(ctx, self.config.auto_batch);

        let activity = NewActivity {
            event,
            action: labels.action,
            log: labels.log,
            description: Some(labels.description),
            subject: subject.subject(),
            causer: ctx.causer().cloned(),
            properties,
            meta: ctx.meta().clone(),
            batch_id,
            created_at: Utc::now(),
        };

        match self.store.append(activity).await {
            Ok(record) => {
                debug!(
                    id = record.id,
                    subject = %record.subject,
                    event = %record.event,
                    batch_id = record.batch_id.as_deref(),
                    "activity recorded"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(error = %e, "failed to persist activity");
                Err(e.into())
            }
        }
    }

    fn properties<T: Trackable + ?Sized>(
        subject: &T,
        event: ActivityEvent,
        changes: Option<Changes>,
        attribute_override: Option<Attributes>,
    ) -> Result<Attributes, TrackError> {
        if let Some(properties) = subject
            .activity_properties(event, attribute_override.as_ref())
            .map_err(TrackError::hook("activity_properties"))?
        {
            return Ok(properties);
        }

        Ok(match event {
            ActivityEvent::Created => attribute_override.unwrap_or_else(|| subject.attributes()),
            ActivityEvent::Updated => changes.map(changes_to_properties).unwrap_or_default(),
            ActivityEvent::Deleted | ActivityEvent::Restored => Attributes::new(),
        })
    }
}
