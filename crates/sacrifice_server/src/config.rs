//! Server configuration.

use crate::InactivityPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the session server.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ServerConfig {
    /// Interface to bind to.
    #[serde(default = "default_host")]
    #[setters(into)]
    host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    port: u16,

    /// Seconds between reaper checks.
    #[serde(default = "default_reaper_interval_secs")]
    reaper_interval_secs: u64,

    /// Seconds without a move or connect before the game is released.
    #[serde(default = "default_inactivity_timeout_secs")]
    inactivity_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_reaper_interval_secs() -> u64 {
    60
}

fn default_inactivity_timeout_secs() -> u64 {
    10 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            reaper_interval_secs: default_reaper_interval_secs(),
            inactivity_timeout_secs: default_inactivity_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(bind = %config.bind_address(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::new("host must not be empty"));
        }
        if self.reaper_interval_secs == 0 {
            return Err(ConfigError::new(
                "reaper_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.inactivity_timeout_secs == 0 {
            return Err(ConfigError::new(
                "inactivity_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies the `PORT` environment variable, if set.
    #[instrument(skip(self))]
    pub fn with_env_port(self) -> Result<Self, ConfigError> {
        self.override_port(std::env::var("PORT").ok())
    }

    fn override_port(self, raw: Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = raw else {
            return Ok(self);
        };
        let port = raw
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::new(format!("Invalid PORT {:?}: {}", raw, e)))?;
        debug!(port, "Port taken from environment");
        Ok(self.with_port(port))
    }

    /// `host:port`, ready for display or binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reaper timing derived from this config.
    pub fn inactivity_policy(&self) -> InactivityPolicy {
        InactivityPolicy::new(
            Duration::from_secs(self.reaper_interval_secs),
            Duration::from_secs(self.inactivity_timeout_secs),
        )
    }
}

/// A config file that could not be read, parsed, or accepted.
///
/// Carries the call site that rejected it so `check-config` output points at
/// the failing rule.
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid server config: {} ({}:{})", reason, file, line)]
pub struct ConfigError {
    /// What was wrong.
    pub reason: String,
    /// Line of the check that failed.
    pub line: u32,
    /// Source file of the check that failed.
    pub file: &'static str,
}

impl ConfigError {
    #[track_caller]
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            reason: reason.into(),
            line: caller.line(),
            file: caller.file(),
        }
    }
}
