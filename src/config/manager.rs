//! Manager options.

use super::defaults::default_true;
use serde::Deserialize;

/// Options passed to [`MetricManager::with_config`](crate::MetricManager::with_config).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagerConfig {
    /// Run per-source poll callbacks on scoped threads (default: false).
    #[serde(default)]
    pub parallel_poll: bool,
    /// Drop identity-cache entries whose source is gone on every
    /// discovery call (default: true).
    #[serde(default = "default_true")]
    pub sweep_stale: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            parallel_poll: false,
            sweep_stale: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_correct() {
        let config = ManagerConfig::default();
        assert!(!config.parallel_poll);
        assert!(config.sweep_stale);
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let config: ManagerConfig = toml::from_str("parallel_poll = true").unwrap();
        assert!(config.parallel_poll);
        assert!(config.sweep_stale);
    }
}
