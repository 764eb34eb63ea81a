//! Action, log and description resolution.

use activity_core::ActivityEvent;
use activity_core::refs::type_base_name;

use crate::error::TrackError;
use crate::trackable::Trackable;

/// Human-facing labels attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub action: Option<String>,
    pub log: String,
    pub description: String,
}

/// Fallback description: `"<TypeBaseName> <event>"`.
#[must_use]
pub fn default_description(subject_type: &str, event: ActivityEvent) -> String {
    format!("{} {event}", type_base_name(subject_type))
}

/// Resolve labels, preferring subject hooks over `default_log` and the
/// generated description.
///
/// # Errors
///
/// Returns `TrackError::Hook` if a subject hook fails.
pub fn resolve_labels<T: Trackable + ?Sized>(
    subject: &T,
    event: ActivityEvent,
    default_log: &str,
) -> Result<Labels, TrackError> {
    let action = subject
        .activity_action(event)
        .map_err(TrackError::hook("activity_action"))?;
    let log = subject
        .activity_log()
        .map_err(TrackError::hook("activity_log"))?
        .unwrap_or_else(|| default_log.to_string());
    let description = subject
        .activity_description(event)
        .map_err(TrackError::hook("activity_description"))?
        .unwrap_or_else(|| default_description(subject.subject_type(), event));

    Ok(Labels {
        action,
        log,
        description,
    })
}

#[cfg(test)]
mod tests {
    use activity_core::Attributes;
    use anyhow::anyhow;

    use super::*;

    struct Comment;

    impl Trackable for Comment {
        fn subject_type(&self) -> &str {
            "blog::Comment"
        }
        fn subject_id(&self) -> u64 {
            3
        }
        fn attributes(&self) -> Attributes {
            Attributes::new()
        }
    }

    struct Invoice;

    impl Trackable for Invoice {
        fn subject_type(&self) -> &str {
            "billing::Invoice"
        }
        fn subject_id(&self) -> u64 {
            1001
        }
        fn attributes(&self) -> Attributes {
            Attributes::new()
        }
        fn activity_action(&self, event: ActivityEvent) -> anyhow::Result<Option<String>> {
            Ok(Some(match event {
                ActivityEvent::Created => "invoice_issued".into(),
                other => other.to_string(),
            }))
        }
        fn activity_log(&self) -> anyhow::Result<Option<String>> {
            Ok(Some("invoices".into()))
        }
        fn activity_description(&self, _event: ActivityEvent) -> anyhow::Result<Option<String>> {
            Ok(Some("Invoice #1001 issued".into()))
        }
    }

    struct Broken;

    impl Trackable for Broken {
        fn subject_type(&self) -> &str {
            "app::Broken"
        }
        fn subject_id(&self) -> u64 {
            1
        }
        fn attributes(&self) -> Attributes {
            Attributes::new()
        }
        fn activity_description(&self, _event: ActivityEvent) -> anyhow::Result<Option<String>> {
            Err(anyhow!("template missing"))
        }
    }

    #[test]
    fn defaults_without_hooks() {
        let labels = resolve_labels(&Comment, ActivityEvent::Deleted, "default").unwrap();
        assert_eq!(
            labels,
            Labels {
                action: None,
                log: "default".into(),
                description: "Comment deleted".into(),
            }
        );
    }

    #[test]
    fn hooks_take_precedence() {
        let labels = resolve_labels(&Invoice, ActivityEvent::Created, "default").unwrap();
        assert_eq!(labels.action.as_deref(), Some("invoice_issued"));
        assert_eq!(labels.log, "invoices");
        assert_eq!(labels.description, "Invoice #1001 issued");
    }

    #[test]
    fn failing_hook_propagates_without_fallback() {
        let err = resolve_labels(&Broken, ActivityEvent::Created, "default").unwrap_err();
        assert!(matches!(
            err,
            TrackError::Hook { hook: "activity_description", .. }
        ));
        assert!(err.to_string().contains("template missing"));
    }
}
