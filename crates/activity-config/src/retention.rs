//! Retention window for pruning old activity.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest retention window accepted, one hundred years.
pub const MAX_KEEP_DAYS: u32 = 36_500;

const fn default_keep_days() -> u32 {
    90
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Number of days of activity to keep when pruning.
    #[serde(default = "default_keep_days")]
    pub keep_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_days: default_keep_days(),
        }
    }
}

impl RetentionConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `keep_days` is zero or above
    /// [`MAX_KEEP_DAYS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keep_days == 0 {
            return Err(ConfigError::invalid(
                "retention.keep_days",
                "must be a positive number of days",
            ));
        }
        if self.keep_days > MAX_KEEP_DAYS {
            return Err(ConfigError::invalid(
                "retention.keep_days",
                format!("must be at most {MAX_KEEP_DAYS} days"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        RetentionConfig { keep_days: 1 }.validate().unwrap();
        RetentionConfig {
            keep_days: MAX_KEEP_DAYS,
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn rejects_window_past_the_bound() {
        for keep_days in [MAX_KEEP_DAYS + 1, 100_000_000, u32::MAX] {
            assert!(matches!(
                RetentionConfig { keep_days }.validate(),
                Err(ConfigError::InvalidValue { ref field, .. }) if field == "retention.keep_days"
            ));
        }
    }
}
