//! Daemon configuration.
//!
//! Loaded from a TOML file, then overridable per field through
//! `PORTMAPD_*` environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Could not parse the file contents.
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        /// The file path.
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// An environment override holds a non-numeric value.
    #[error("Invalid value '{value}' for {variable}")]
    InvalidEnv {
        /// The environment variable name.
        variable: String,
        /// The offending value.
        value: String,
    },
}

/// portmapd settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortmapConfig {
    /// Upper bound on degree numbers probed when the device does not
    /// advertise max-degrees. The inherited default of 20 is of
    /// uncertain origin (protocol default vs. defensive guess); keep
    /// it overridable rather than relying on it.
    pub max_degrees: u16,

    /// Upper bound on SRG numbers probed when the device does not
    /// advertise max-srgs. Same caveat as `max_degrees`.
    pub max_srgs: u16,

    /// Per-read device timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for PortmapConfig {
    fn default() -> Self {
        Self {
            max_degrees: 20,
            max_srgs: 20,
            read_timeout_ms: 30_000,
        }
    }
}

impl PortmapConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies `PORTMAPD_MAX_DEGREES`, `PORTMAPD_MAX_SRGS` and
    /// `PORTMAPD_READ_TIMEOUT_MS` overrides when set.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = read_env_u64("PORTMAPD_MAX_DEGREES")? {
            self.max_degrees = value as u16;
        }
        if let Some(value) = read_env_u64("PORTMAPD_MAX_SRGS")? {
            self.max_srgs = value as u16;
        }
        if let Some(value) = read_env_u64("PORTMAPD_READ_TIMEOUT_MS")? {
            self.read_timeout_ms = value;
        }
        Ok(self)
    }

    /// Per-read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn read_env_u64(variable: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(variable) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                variable: variable.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
