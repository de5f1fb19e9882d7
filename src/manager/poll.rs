//! Poll pipeline.
//!
//! 1. keep the poll-capable descriptors of the interest set (deduplicated)
//! 2. group them by source
//! 3. notify each poll-aware source once with its whole group
//! 4. sample every descriptor and wrap the value
//!
//! Nothing is cached between calls.

use super::{MetricManager, panic_message};
use crate::discovery::{SourceId, SourceRef};
use crate::metric::{MetricDescriptor, MetricPayload, MetricValue, SampledValue};
use crate::telemetry::{CycleTimer, spans};
use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, warn};

/// Outcome of one [`MetricManager::poll_and_dispatch`] cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollReport {
    /// Values produced by sampling.
    pub sampled: usize,
    /// Values handed to listeners, summed over listeners.
    pub deliveries: usize,
    /// Listeners considered in this cycle.
    pub listeners: usize,
}

struct SourceGroup {
    source: SourceRef,
    metrics: Vec<MetricDescriptor>,
}

impl MetricManager {
    /// Sample the poll-capable descriptors of `interest`.
    ///
    /// A failing source callback is logged and does not stop sampling. A
    /// value that cannot be represented is logged once per descriptor and
    /// skipped.
    pub fn poll<I>(&self, interest: I) -> Vec<MetricValue>
    where
        I: IntoIterator<Item = MetricDescriptor>,
    {
        let mut seen = HashSet::new();
        let metrics: Vec<MetricDescriptor> = interest
            .into_iter()
            .filter(|m| m.kind().is_poll() && seen.insert(m.clone()))
            .collect();
        if metrics.is_empty() {
            return Vec::new();
        }

        let groups = Self::group_by_source(&metrics);
        self.notify_sources(&groups);

        let values: Vec<MetricValue> = metrics.iter().filter_map(|m| self.sample(m)).collect();
        self.stats.record_sampled(values.len());
        values
    }

    /// Poll everything listeners are interested in and deliver each value to
    /// every listener whose interest set contains its metric.
    pub fn poll_and_dispatch(&self) -> PollReport {
        let _timer = CycleTimer::new(self.stats_handle());
        let snapshot = self.interest.snapshot();

        let mut seen = HashSet::new();
        let union: Vec<MetricDescriptor> = snapshot
            .iter()
            .flat_map(|(_, interest)| interest.iter())
            .filter(|m| m.kind().is_poll() && seen.insert((*m).clone()))
            .cloned()
            .collect();

        let _span = spans::poll_cycle(union.len(), snapshot.len()).entered();
        let values = self.poll(union);

        let mut deliveries = 0;
        for value in &values {
            let interested: Vec<_> = snapshot
                .iter()
                .filter(|(_, interest)| interest.contains(value.descriptor()))
                .map(|(listener, _)| listener.clone())
                .collect();
            deliveries += self.deliver_all(&interested, value);
        }
        self.stats.record_deliveries(deliveries);

        PollReport {
            sampled: values.len(),
            deliveries,
            listeners: snapshot.len(),
        }
    }

    fn group_by_source(metrics: &[MetricDescriptor]) -> Vec<SourceGroup> {
        let mut index: HashMap<SourceId, usize> = HashMap::new();
        let mut groups: Vec<SourceGroup> = Vec::new();
        for metric in metrics {
            let Some(source) = metric.source() else {
                continue;
            };
            let slot = *index.entry(metric.source_id()).or_insert_with(|| {
                groups.push(SourceGroup {
                    source,
                    metrics: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].metrics.push(metric.clone());
        }
        groups
    }

    fn notify_sources(&self, groups: &[SourceGroup]) {
        let poll_aware: Vec<&SourceGroup> = groups.iter().filter(|g| g.source.handles_poll()).collect();
        if self.config.parallel_poll && poll_aware.len() > 1 {
            std::thread::scope(|scope| {
                for group in &poll_aware {
                    scope.spawn(move || self.notify_source(group));
                }
            });
        } else {
            for group in poll_aware {
                self.notify_source(group);
            }
        }
    }

    fn notify_source(&self, group: &SourceGroup) {
        let name = group.source.display_name();
        let _span = spans::source_callback(&name, group.metrics.len()).entered();
        let outcome = catch_unwind(AssertUnwindSafe(|| group.source.on_poll_metrics(&group.metrics)));
        let message = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()).to_string(),
        };
        self.stats.record_callback_failure();
        warn!(source = %name, error = %message, "unhandled failure in on_poll_metrics");
    }

    fn sample(&self, metric: &MetricDescriptor) -> Option<MetricValue> {
        let sampled = match catch_unwind(AssertUnwindSafe(|| metric.sample())) {
            Ok(Some(v)) => v,
            Ok(None) => {
                debug!(metric = %metric.full_name(), "source dropped; metric skipped");
                return None;
            }
            Err(_) => SampledValue::Unsupported("panicked getter"),
        };

        let value_type = sampled.type_label();
        let metric_type = metric.metric_type();
        let payload = match sampled {
            SampledValue::Double(v) => Some(MetricPayload::Double(v)),
            SampledValue::Integer(v) => Some(MetricPayload::Double(v as f64)),
            SampledValue::Boolean(v) => Some(MetricPayload::Boolean(v)),
            SampledValue::Text(v) => Some(MetricPayload::String(v)),
            SampledValue::Null if metric_type.accepts_empty() => Some(MetricPayload::Empty),
            SampledValue::Null | SampledValue::Unsupported(_) => None,
        }
        .filter(|p| p.fits(metric_type.value, metric_type.accepts_empty()));

        match payload {
            Some(payload) => Some(MetricValue::new(metric.clone(), payload)),
            None => {
                self.stats.record_sampling_error();
                if self.logged_errors.insert(metric.clone()) {
                    error!(
                        metric = %metric.full_name(),
                        expected = %metric_type,
                        value_type,
                        "metric value is not a supported type"
                    );
                }
                None
            }
        }
    }
}
