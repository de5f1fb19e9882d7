//! Push-driven heartbeat.
//!
//! Owns one dynamic push metric, `Heartbeat / Beat`, whose value is the
//! number of beats pushed so far. Beats are skipped while nobody listens.

use crate::discovery::{MetricSource, SourceRef, SourceSet};
use crate::error::MetricResult;
use crate::manager::{DynamicMetric, MetricManager};
use crate::metric::{MetricAttributes, MetricDescriptor, SuggestedInitialState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct HeartbeatSource {
    beat: OnceLock<MetricDescriptor>,
    beats: AtomicU64,
}

impl HeartbeatSource {
    /// Create the source, its push metric, and add it to `sources`.
    pub fn register(manager: &MetricManager, sources: &SourceSet) -> MetricResult<Arc<Self>> {
        let heartbeat = Arc::new(Self::default());
        let source: SourceRef = heartbeat.clone();
        let spec = DynamicMetric::push::<f64>("Beat", "Heartbeat").attributes(
            MetricAttributes::new()
                .unit("beats")
                .initial_state(SuggestedInitialState::Enabled),
        );
        let beat = manager.create_metric(&source, spec)?;
        // Freshly constructed, so the cell is empty.
        let _ = heartbeat.beat.set(beat);
        sources.add(source);
        Ok(heartbeat)
    }

    pub fn metric(&self) -> Option<&MetricDescriptor> {
        self.beat.get()
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    /// Push one beat if anyone is interested. Returns the delivery count.
    pub fn tick(&self, manager: &MetricManager) -> MetricResult<usize> {
        let Some(beat) = self.beat.get() else {
            return Ok(0);
        };
        if !manager.has_interest(beat) {
            return Ok(0);
        }
        let n = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        manager.push(beat, n as f64)
    }

    /// Run [`tick`](Self::tick) every `period` until the task is aborted.
    pub fn spawn(self: Arc<Self>, manager: Arc<MetricManager>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if let Err(e) = self.tick(&manager) {
                    warn!(error = %e, "heartbeat push failed");
                }
            }
        })
    }
}

impl MetricSource for HeartbeatSource {
    fn display_name(&self) -> String {
        "Heartbeat".to_string()
    }

    fn additional_metrics(&self) -> Vec<MetricDescriptor> {
        self.beat.get().cloned().into_iter().collect()
    }

    fn on_subscriber_count_changed(&self, metric: &MetricDescriptor, count: usize) {
        debug!(metric = %metric.full_name(), count, "heartbeat subscribers changed");
    }
}
