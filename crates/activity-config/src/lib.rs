//! # activity-config
//!
//! Layered configuration loading for the activity trail using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ACTIVITY_*` prefix, `__` as separator)
//! 2. Project-level `.activity/config.toml`
//! 3. User-level `~/.config/activity/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ACTIVITY_TRACKING__ENABLED` -> `tracking.enabled`,
//! `ACTIVITY_RETENTION__KEEP_DAYS` -> `retention.keep_days`, etc.
//!
//! The loaded settings are validated before they are returned, so a malformed
//! ignore list or log name fails at startup rather than on the first event.
//!
//! # Usage
//!
//! ```no_run
//! use activity_config::ActivityConfig;
//!
//! let config = ActivityConfig::load_with_dotenv().expect("config");
//! if config.tracking.enabled {
//!     println!("default log: {}", config.tracking.default_log);
//! }
//! ```

mod database;
mod error;
mod retention;
mod tracking;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use retention::{MAX_KEEP_DAYS, RetentionConfig};
pub use tracking::{MAX_LOG_NAME_LEN, TrackingConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ActivityConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl ActivityConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or the merged
    /// settings fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate settings from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` on extraction failure and
    /// `ConfigError::InvalidValue` on validation failure.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracking.validate()?;
        self.retention.validate()?;
        Ok(())
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".activity/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ACTIVITY_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("activity").join("config.toml"))
    }
}
