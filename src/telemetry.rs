//! Telemetry utilities: subscriber setup, cycle timing and standard spans.

use crate::config::{LogConfig, LogFormat};
use crate::manager::DeliveryStats;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `log.filter`. Fails if a subscriber is
/// already installed or the configured filter does not parse.
pub fn init(log: &LogConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.filter)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match log.format {
        LogFormat::Text => builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}")),
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}")),
    }
}

/// Guard for timing one poll cycle.
///
/// Records the cycle duration when dropped.
pub struct CycleTimer {
    stats: Arc<DeliveryStats>,
    start: Instant,
}

impl CycleTimer {
    /// Start timing a cycle.
    pub fn new(stats: Arc<DeliveryStats>) -> Self {
        Self {
            stats,
            start: Instant::now(),
        }
    }
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        self.stats.record_cycle(self.start.elapsed());
    }
}

/// Standardized span constructors for metric delivery.
pub mod spans {
    use crate::metric::MetricDescriptor;
    use tracing::{Span, debug_span, trace_span};

    /// Span covering one poll-and-dispatch cycle.
    pub fn poll_cycle(metrics: usize, listeners: usize) -> Span {
        debug_span!("poll_cycle", metrics, listeners)
    }

    /// Span covering the fan-out of one pushed value.
    pub fn push(metric: &MetricDescriptor) -> Span {
        trace_span!("push", metric = %metric.full_name())
    }

    /// Span covering one source's poll notification.
    pub fn source_callback(source: &str, metrics: usize) -> Span {
        debug_span!("source_callback", source = %source, metrics)
    }
}
