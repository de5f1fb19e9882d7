//! Structured-log listener.

use crate::manager::{ListenerRef, MetricListener, MetricManager, MetricObserver};
use crate::metric::{MetricDescriptor, MetricValue, SuggestedInitialState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Logs every received value as a JSON document.
#[derive(Debug, Default)]
pub struct LogSink {
    logged: AtomicU64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values logged so far.
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::Relaxed)
    }

    /// The JSON document logged for `value`.
    pub fn render(value: &MetricValue) -> serde_json::Result<String> {
        serde_json::to_string(value)
    }
}

impl MetricListener for LogSink {
    fn on_metric(&self, value: &MetricValue) {
        match Self::render(value) {
            Ok(json) => {
                self.logged.fetch_add(1, Ordering::Relaxed);
                info!(target: "metricd::values", metric = %value.descriptor().full_name(), value = %json);
            }
            Err(e) => {
                warn!(metric = %value.descriptor().full_name(), error = %e, "failed to serialize metric value");
            }
        }
    }
}

/// Adds newly created metrics to a listener's interest set.
///
/// Metrics suggested to start disabled are left out.
pub struct FollowCreated {
    manager: Weak<MetricManager>,
    listener: ListenerRef,
}

impl FollowCreated {
    pub fn new(manager: &Arc<MetricManager>, listener: ListenerRef) -> Self {
        Self {
            manager: Arc::downgrade(manager),
            listener,
        }
    }
}

impl MetricObserver for FollowCreated {
    fn on_metric_created(&self, metric: &MetricDescriptor) {
        if metric.attributes().suggested_initial_state == SuggestedInitialState::Disabled {
            return;
        }
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        let mut interest: Vec<MetricDescriptor> = manager
            .interest_of(&self.listener)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        interest.push(metric.clone());
        manager.subscribe(&self.listener, interest);
        debug!(metric = %metric.full_name(), "listener follows created metric");
    }
}
