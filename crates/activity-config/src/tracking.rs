//! Change-tracking settings consumed by the tracker.

use activity_core::ActivityEvent;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum length of the `log` column.
pub const MAX_LOG_NAME_LEN: usize = 64;

const fn default_true() -> bool {
    true
}

fn default_log() -> String {
    "default".to_string()
}

fn default_events() -> Vec<ActivityEvent> {
    ActivityEvent::ALL.to_vec()
}

fn default_ignore_attributes() -> Vec<String> {
    ["created_at", "updated_at", "deleted_at", "remember_token"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrackingConfig {
    /// Global kill switch. When false nothing is recorded.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log category used when a subject does not name its own.
    #[serde(default = "default_log")]
    pub default_log: String,

    /// Events recorded for subjects that do not declare their own set.
    #[serde(default = "default_events")]
    pub events: Vec<ActivityEvent>,

    /// Attributes excluded from diffs for every subject.
    #[serde(default = "default_ignore_attributes")]
    pub ignore_attributes: Vec<String>,

    /// Record the authenticated actor as causer.
    #[serde(default = "default_true")]
    pub capture_causer: bool,

    /// Record request method and host in `meta`.
    #[serde(default)]
    pub capture_request_meta: bool,

    /// Record the caller's network address in `meta`.
    #[serde(default)]
    pub capture_ip: bool,

    /// Generate a batch id per unit of work when none is set.
    #[serde(default)]
    pub auto_batch: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_log: default_log(),
            events: default_events(),
            ignore_attributes: default_ignore_attributes(),
            capture_causer: true,
            capture_request_meta: false,
            capture_ip: false,
            auto_batch: false,
        }
    }
}

impl TrackingConfig {
    /// Reject settings that would otherwise fail on every tracked event.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty or oversized default
    /// log name, or an ignore-list entry that is empty or contains whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_log.trim().is_empty() {
            return Err(ConfigError::invalid(
                "tracking.default_log",
                "must not be empty",
            ));
        }
        if self.default_log.chars().count() > MAX_LOG_NAME_LEN {
            return Err(ConfigError::invalid(
                "tracking.default_log",
                format!("must be at most {MAX_LOG_NAME_LEN} characters"),
            ));
        }
        for attribute in &self.ignore_attributes {
            if attribute.is_empty() || attribute.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid(
                    "tracking.ignore_attributes",
                    format!("'{attribute}' is not a valid attribute name"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = TrackingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_log, "default");
        assert_eq!(config.events, ActivityEvent::ALL.to_vec());
        assert!(config.ignore_attributes.contains(&"remember_token".to_string()));
        assert!(config.capture_causer);
        assert!(!config.capture_request_meta);
        assert!(!config.capture_ip);
        assert!(!config.auto_batch);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_blank_ignore_entry() {
        let config = TrackingConfig {
            ignore_attributes: vec!["updated_at".into(), " ".into()],
            ..TrackingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "tracking.ignore_attributes"
        ));
    }

    #[test]
    fn rejects_oversized_log_name() {
        let config = TrackingConfig {
            default_log: "x".repeat(MAX_LOG_NAME_LEN + 1),
            ..TrackingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn log_name_length_counts_characters() {
        let config = TrackingConfig {
            default_log: "é".repeat(MAX_LOG_NAME_LEN),
            ..TrackingConfig::default()
        };
        config.validate().unwrap();

        let config = TrackingConfig {
            default_log: "é".repeat(MAX_LOG_NAME_LEN + 1),
            ..TrackingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
