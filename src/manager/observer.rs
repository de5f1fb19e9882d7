//! Observers for metric lifecycle events.
//!
//! Distinct from value listeners: observers hear about metrics being
//! created and push metrics changing availability.

use super::isolate;
use crate::metric::MetricDescriptor;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for observing metric lifecycle changes.
///
/// Both methods default to no-ops so observers implement only what they need.
pub trait MetricObserver: Send + Sync {
    /// A metric was created by dynamic registration.
    fn on_metric_created(&self, _metric: &MetricDescriptor) {}

    /// A push metric's availability changed.
    fn on_availability_changed(&self, _metric: &MetricDescriptor) {}
}

/// Handle returned by [`ObserverHub::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Fan-out of lifecycle events to zero or more observers.
#[derive(Default)]
pub struct ObserverHub {
    observers: RwLock<Vec<(ObserverId, Arc<dyn MetricObserver>)>>,
    next_id: AtomicU64,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, observer: Arc<dyn MetricObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    pub fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Notify every observer that `metric` was created. Returns how many
    /// observers panicked.
    pub fn metric_created(&self, metric: &MetricDescriptor) -> usize {
        self.notify("metric_created", metric, |o| o.on_metric_created(metric))
    }

    /// Notify every observer that `metric` changed availability. Returns how
    /// many observers panicked.
    pub fn availability_changed(&self, metric: &MetricDescriptor) -> usize {
        self.notify("availability_changed", metric, |o| o.on_availability_changed(metric))
    }

    fn notify<F>(&self, event: &'static str, metric: &MetricDescriptor, f: F) -> usize
    where
        F: Fn(&dyn MetricObserver),
    {
        // Snapshot so observers may add or remove observers re-entrantly.
        let observers: Vec<Arc<dyn MetricObserver>> =
            self.observers.read().iter().map(|(_, o)| o.clone()).collect();
        observers
            .iter()
            .filter(|observer| !isolate(event, metric, || f(Arc::as_ref(observer))))
            .count()
    }
}
