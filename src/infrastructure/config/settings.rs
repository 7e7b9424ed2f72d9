//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section is optional. The
//! `SHOPLEDGER_DATABASE` environment variable overrides the database path.
//!
//! # Example
//!
//! ```no_run
//! use shopledger::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::locks::LocksConfig;
use super::logging::LoggingConfig;
use super::stats::StatsConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "SHOPLEDGER_DATABASE";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the SQLite ledger database.
    ///
    /// Defaults to "shopledger.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retention and aggregate caching.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Named lock backend and timeouts.
    #[serde(default)]
    pub locks: LocksConfig,
}

fn default_database_path() -> String {
    "shopledger.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
            locks: LocksConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., a zero retention window)
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Defaults with environment overrides, for running without a file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            self.database = database;
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if self.stats.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retention_days",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.stats.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cleanup_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let locks = &self.locks;
        if locks.wait_secs == 0 || locks.hold_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "locks",
                reason: "wait_secs and hold_secs must be greater than 0".to_string(),
            }
            .into());
        }
        if locks.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if locks.database.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "locks.database",
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
