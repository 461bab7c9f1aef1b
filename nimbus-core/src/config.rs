//! Poller configuration
//!
//! Defaults mirror what the management API clients have always used: a fixed
//! 10 second poll interval and a small allowance of dropped connections. Both
//! can be overridden per call site or loaded from a JSON file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::PollContext;

/// Default interval between polls (10 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of consecutive transport failures tolerated before giving up
pub const DEFAULT_DROPPED_CONNECTIONS_ALLOWED: u32 = 3;

/// Default wait after a transport failure before the next attempt (5 seconds)
pub const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Poller options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Interval used when a poll result does not suggest one (default: 10s)
    #[serde(rename = "poll_interval_secs", with = "duration_secs")]
    pub poll_interval: Duration,

    /// Consecutive transport failures tolerated before giving up (default: 3)
    pub dropped_connections_allowed: u32,

    /// Wait after a transport failure (default: 5s)
    #[serde(rename = "failure_backoff_secs", with = "duration_secs")]
    pub failure_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            dropped_connections_allowed: DEFAULT_DROPPED_CONNECTIONS_ALLOWED,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.failure_backoff.is_zero() {
            return Err(ConfigError::Invalid(
                "failure_backoff_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle operation a timeout applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Create,
    Read,
    Update,
    Delete,
}

/// Per-operation deadlines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationTimeouts {
    /// default: 30 minutes
    #[serde(rename = "create_secs", with = "duration_secs")]
    pub create: Duration,
    /// default: 5 minutes
    #[serde(rename = "read_secs", with = "duration_secs")]
    pub read: Duration,
    /// default: 30 minutes
    #[serde(rename = "update_secs", with = "duration_secs")]
    pub update: Duration,
    /// default: 30 minutes
    #[serde(rename = "delete_secs", with = "duration_secs")]
    pub delete: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

impl OperationTimeouts {
    pub fn get(&self, operation: Lifecycle) -> Duration {
        match operation {
            Lifecycle::Create => self.create,
            Lifecycle::Read => self.read,
            Lifecycle::Update => self.update,
            Lifecycle::Delete => self.delete,
        }
    }

    /// Derive a context from `parent` that expires after the operation's timeout
    pub fn context_for(&self, parent: &PollContext, operation: Lifecycle) -> PollContext {
        parent.child().with_timeout(self.get(operation))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, timeout) in [
            ("create_secs", self.create),
            ("read_secs", self.read),
            ("update_secs", self.update),
            ("delete_secs", self.delete),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Top-level provider configuration file
///
/// ```json
/// {
///   "poller": { "poll_interval_secs": 10, "dropped_connections_allowed": 3 },
///   "timeouts": { "update_secs": 3600 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NimbusConfig {
    pub poller: PollerConfig,
    pub timeouts: OperationTimeouts,
}

impl NimbusConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: NimbusConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.poller.validate()?;
        self.timeouts.validate()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
