//! Trackability gate.

use activity_config::TrackingConfig;
use activity_core::ActivityEvent;

use crate::context::ActivityContext;
use crate::trackable::Trackable;

/// Whether `event` on `subject` should be recorded at all.
///
/// Tracking is off when the global switch is off or the context is disabled.
/// Otherwise the subject's own event set (or the configured default set) is
/// handed to [`Trackable::should_track_event`].
pub fn is_tracked<T: Trackable + ?Sized>(
    config: &TrackingConfig,
    ctx: &ActivityContext,
    subject: &T,
    event: ActivityEvent,
) -> bool {
    if !config.enabled || ctx.is_disabled() {
        return false;
    }
    let trackable = subject
        .trackable_events()
        .unwrap_or(config.events.as_slice());
    subject.should_track_event(event, trackable)
}
