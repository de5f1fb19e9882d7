//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Poll Defaults
// =============================================================================

pub fn default_poll_interval_ms() -> u64 {
    1000
}

/// Shortest accepted poll period.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

// =============================================================================
// Log Defaults
// =============================================================================

pub fn default_log_filter() -> String {
    "info".to_string()
}

// =============================================================================
// Source Defaults
// =============================================================================

pub fn default_heartbeat_ms() -> u64 {
    5000
}
