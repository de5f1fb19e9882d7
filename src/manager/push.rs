//! Push pipeline: synchronous fan-out of producer values.

use super::{MetricManager, isolate};
use crate::error::{MetricError, MetricResult};
use crate::manager::interest::ListenerRef;
use crate::metric::{MetricDescriptor, MetricPayload, MetricValue};
use crate::telemetry::spans;
use tracing::trace;

impl MetricManager {
    /// Push a value for `metric` to every interested listener.
    ///
    /// All interested listeners have observed the value when this returns.
    /// Returns how many listeners it was delivered to; the value is not even
    /// constructed when nobody is interested.
    pub fn push(&self, metric: &MetricDescriptor, value: impl Into<MetricPayload>) -> MetricResult<usize> {
        let payload = value.into();
        Self::check_payload(metric, &payload)?;
        let listeners = self.interest.listeners_for(metric);
        if listeners.is_empty() {
            self.stats.record_push(0);
            return Ok(0);
        }
        Ok(self.fan_out(&listeners, MetricValue::new(metric.clone(), payload)))
    }

    pub fn push_double(&self, metric: &MetricDescriptor, value: f64) -> MetricResult<usize> {
        self.push(metric, MetricPayload::Double(value))
    }

    pub fn push_bool(&self, metric: &MetricDescriptor, value: bool) -> MetricResult<usize> {
        self.push(metric, MetricPayload::Boolean(value))
    }

    pub fn push_string(&self, metric: &MetricDescriptor, value: impl Into<String>) -> MetricResult<usize> {
        self.push(metric, MetricPayload::String(value.into()))
    }

    /// Push "no value" to a nullable or string metric.
    pub fn push_empty(&self, metric: &MetricDescriptor) -> MetricResult<usize> {
        self.push(metric, MetricPayload::Empty)
    }

    /// Push a prepared value, keeping its timestamp and metadata.
    pub fn push_value(&self, value: MetricValue) -> MetricResult<usize> {
        Self::check_payload(value.descriptor(), value.payload())?;
        let listeners = self.interest.listeners_for(value.descriptor());
        Ok(self.fan_out(&listeners, value))
    }

    fn check_payload(metric: &MetricDescriptor, payload: &MetricPayload) -> MetricResult<()> {
        let metric_type = metric.metric_type();
        if payload.fits(metric_type.value, metric_type.accepts_empty()) {
            Ok(())
        } else {
            Err(MetricError::ValueTypeMismatch {
                metric: metric.full_name(),
                expected: metric_type.to_string(),
                actual: payload.label(),
            })
        }
    }

    fn fan_out(&self, listeners: &[ListenerRef], value: MetricValue) -> usize {
        let _span = spans::push(value.descriptor()).entered();
        let delivered = self.deliver_all(listeners, &value);
        self.stats.record_push(delivered);
        delivered
    }

    /// Deliver one value to each listener, isolating listener panics.
    /// Returns the number of successful deliveries.
    pub(super) fn deliver_all(&self, listeners: &[ListenerRef], value: &MetricValue) -> usize {
        let mut delivered = 0;
        for listener in listeners {
            if isolate("on_metric", value.descriptor(), || listener.on_metric(value)) {
                delivered += 1;
            } else {
                self.stats.record_listener_panic();
            }
        }
        trace!(metric = %value.descriptor().full_name(), delivered, "value delivered");
        delivered
    }
}
