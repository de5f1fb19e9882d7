//! Availability updates for push metrics.
//!
//! A push metric may temporarily have no value without being removed.
//! The flag lives on the shared descriptor instance and the instance is
//! written back to the identity cache, so later discovery sees the new state.

use super::MetricManager;
use crate::error::{MetricError, MetricResult};
use crate::metric::MetricDescriptor;
use tracing::debug;

impl MetricManager {
    /// Mark a push metric as (un)available and notify observers.
    ///
    /// Fails with [`MetricError::InvalidArgument`] for poll-only metrics.
    pub fn set_availability(&self, metric: &MetricDescriptor, is_available: bool) -> MetricResult<()> {
        if !metric.kind().is_push() {
            return Err(MetricError::InvalidArgument {
                parameter: "metric",
                reason: format!(
                    "cannot update availability of poll metric '{}'",
                    metric.full_name()
                ),
            });
        }

        let target = self.cached_instance(metric);
        let previous = target.set_available(is_available);
        // A caller may hold a distinct but equal instance; keep it in step.
        if !target.same_instance(metric) {
            metric.set_available(is_available);
        }
        self.identity.store(target.clone());

        debug!(
            metric = %target.full_name(),
            available = is_available,
            changed = previous != is_available,
            "metric availability updated"
        );
        self.stats.record_observer_panics(self.observers.availability_changed(&target));
        Ok(())
    }

    /// The identity-cache instance equal to `metric`, or `metric` itself.
    fn cached_instance(&self, metric: &MetricDescriptor) -> MetricDescriptor {
        self.identity
            .get(metric.source_id(), metric.member_key())
            .filter(|cached| cached == metric)
            .unwrap_or_else(|| metric.clone())
    }
}
