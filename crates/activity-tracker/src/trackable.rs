//! Capability interface implemented by tracked record types.
//!
//! Only the identity and attribute accessors are required. Every other hook
//! has a default that defers to configuration, so a type opts into a
//! customization simply by overriding the method.

use activity_core::{ActivityEvent, Attributes, ModelRef};

pub trait Trackable {
    /// Type tag stored as `subject_type`, e.g. `billing::Invoice`.
    fn subject_type(&self) -> &str;

    fn subject_id(&self) -> u64;

    /// Current (post-mutation) attribute values.
    fn attributes(&self) -> Attributes;

    /// Attribute values before the mutation being tracked.
    ///
    /// Only consulted for `updated` events. Defaults to [`Self::attributes`],
    /// which reports no changes.
    fn original_attributes(&self) -> Attributes {
        self.attributes()
    }

    fn subject(&self) -> ModelRef {
        ModelRef::new(self.subject_type(), self.subject_id())
    }

    /// Events this type records. `None` falls back to the configured set.
    fn trackable_events(&self) -> Option<&[ActivityEvent]> {
        None
    }

    /// Final say on whether `event` is recorded, given the resolved set.
    fn should_track_event(&self, event: ActivityEvent, trackable: &[ActivityEvent]) -> bool {
        trackable.contains(&event)
    }

    /// Attributes excluded from diffs, in addition to the global list.
    fn ignored_attributes(&self) -> &[&str] {
        &[]
    }

    /// Semantic action label for `event`, e.g. `invoice_issued`.
    ///
    /// # Errors
    ///
    /// Any error is propagated to the caller of `track`.
    fn activity_action(&self, _event: ActivityEvent) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    /// Log category. `None` uses the configured default log.
    ///
    /// # Errors
    ///
    /// Any error is propagated to the caller of `track`.
    fn activity_log(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    /// Human-readable description. `None` yields `"<Type> <event>"`.
    ///
    /// # Errors
    ///
    /// Any error is propagated to the caller of `track`.
    fn activity_description(&self, _event: ActivityEvent) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    /// Full replacement for the recorded `properties`.
    ///
    /// `attribute_override` is the value the caller passed to `track`.
    ///
    /// # Errors
    ///
    /// Any error is propagated to the caller of `track`.
    fn activity_properties(
        &self,
        _event: ActivityEvent,
        _attribute_override: Option<&Attributes>,
    ) -> anyhow::Result<Option<Attributes>> {
        Ok(None)
    }
}
