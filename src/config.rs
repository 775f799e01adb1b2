//! Runtime configuration for deployprep
//!
//! Loaded from environment variables with defaults:
//!
//! - `DEPLOYPREP_SETTINGS_PREFIX`: namespace for workspace settings keys - default: "appService"
//! - `DEPLOYPREP_PROBE_INTERVAL_SECS`: delay between site validation attempts - default: "5"
//! - `DEPLOYPREP_PROBE_MAX_ATTEMPTS`: site validation attempts before giving up - default: "12"
//! - `DEPLOYPREP_REQUEST_TIMEOUT`: per-request timeout in seconds - default: "30"
//! - `DEPLOYPREP_LOG_LEVEL`: logging level - default: "info"

use crate::workspace::settings::DEFAULT_SETTINGS_PREFIX;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;
const DEFAULT_PROBE_MAX_ATTEMPTS: u32 = 12;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPrepConfig {
    /// Prefix for workspace settings keys (`<prefix>.preDeployTask`)
    pub settings_prefix: String,

    pub probe_interval_secs: u64,

    pub probe_max_attempts: u32,

    pub request_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Default for DeployPrepConfig {
    /// Reads `DEPLOYPREP_*` variables, falling back to defaults for
    /// anything missing or unparsable
    fn default() -> Self {
        let settings_prefix = env::var("DEPLOYPREP_SETTINGS_PREFIX")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PREFIX.to_string());

        let log_level = env::var("DEPLOYPREP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            settings_prefix,
            probe_interval_secs: env_parsed("DEPLOYPREP_PROBE_INTERVAL_SECS")
                .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS),
            probe_max_attempts: env_parsed("DEPLOYPREP_PROBE_MAX_ATTEMPTS")
                .unwrap_or(DEFAULT_PROBE_MAX_ATTEMPTS),
            request_timeout_secs: env_parsed("DEPLOYPREP_REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level,
        }
    }
}

impl DeployPrepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be between 1 second and 10 minutes".to_string(),
            ));
        }

        if self.probe_interval_secs == 0 || self.probe_interval_secs > 300 {
            return Err(ConfigError::ValidationFailed(
                "Probe interval must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.probe_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "Probe max attempts must be at least 1".to_string(),
            ));
        }

        if self.settings_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(format!(
                "Settings prefix must not contain whitespace: '{}'",
                self.settings_prefix
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }
}

impl fmt::Display for DeployPrepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "deployprep configuration:")?;
        writeln!(f, "  Settings Prefix: {}", self.settings_prefix)?;
        writeln!(f, "  Probe Interval: {}s", self.probe_interval_secs)?;
        writeln!(f, "  Probe Max Attempts: {}", self.probe_max_attempts)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
