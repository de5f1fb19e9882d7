//! Sections read only by the `metricd` binary.

use super::defaults::{
    default_heartbeat_ms, default_log_filter, default_poll_interval_ms, default_true,
};
use serde::Deserialize;
use std::time::Duration;

/// Poll cycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollConfig {
    /// Poll cycle period in milliseconds (default: 1000, minimum: 10).
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Built-in sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourcesConfig {
    /// Register the process source (default: true).
    #[serde(default = "default_true")]
    pub process: bool,
    /// Heartbeat push period in milliseconds; 0 disables (default: 5000).
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            process: default_true(),
            heartbeat_ms: default_heartbeat_ms(),
        }
    }
}

impl SourcesConfig {
    /// Heartbeat period, or `None` when disabled.
    pub fn heartbeat(&self) -> Option<Duration> {
        (self.heartbeat_ms > 0).then(|| Duration::from_millis(self.heartbeat_ms))
    }
}
