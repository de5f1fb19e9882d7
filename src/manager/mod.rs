//! The metric manager.
//!
//! `MetricManager` owns every piece of shared state and is constructed once
//! per process (or per test). Operations are grouped by pipeline:
//! - [`enumerate`]: discovery through the adapter and the identity cache
//! - [`registration`]: dynamic poll/push metric creation
//! - [`push`]: synchronous fan-out of pushed values
//! - [`poll`]: sampling and poll-cycle dispatch
//! - [`availability`]: availability updates for push metrics
//!
//! No registry or cache lock is held while source, listener or observer code
//! runs. The only lock around a callback is the count gate of the one
//! descriptor whose subscriber count is being reported.

mod availability;
mod enumerate;
mod identity;
mod interest;
mod observer;
mod poll;
mod push;
mod registration;
mod stats;

pub use identity::IdentityCache;
pub use interest::{CountChange, InterestRegistry, InterestSet, ListenerId, ListenerRef, MetricListener};
pub use observer::{MetricObserver, ObserverHub, ObserverId};
pub use poll::PollReport;
pub use registration::DynamicMetric;
pub use stats::{DeliveryStats, StatsSnapshot};

use crate::config::ManagerConfig;
use crate::discovery::{DiscoveryAdapter, SourceSet};
use crate::metric::MetricDescriptor;
use dashmap::{DashMap, DashSet};
use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, warn};

/// Metric registry and delivery engine.
pub struct MetricManager {
    adapter: Arc<dyn DiscoveryAdapter>,
    config: ManagerConfig,
    identity: Arc<IdentityCache>,
    interest: InterestRegistry,
    observers: ObserverHub,
    /// Descriptors whose unsupported sampled value has already been logged.
    logged_errors: DashSet<MetricDescriptor>,
    /// Per-descriptor gate ordering subscriber-count reports, holding the
    /// last count reported to the source.
    count_gates: DashMap<MetricDescriptor, CountGate>,
    stats: Arc<DeliveryStats>,
}

impl MetricManager {
    /// Create a manager with the default configuration.
    pub fn new(adapter: Arc<dyn DiscoveryAdapter>) -> Self {
        Self::with_config(adapter, ManagerConfig::default())
    }

    pub fn with_config(adapter: Arc<dyn DiscoveryAdapter>, config: ManagerConfig) -> Self {
        Self {
            adapter,
            config,
            identity: Arc::new(IdentityCache::new()),
            interest: InterestRegistry::new(),
            observers: ObserverHub::new(),
            logged_errors: DashSet::new(),
            count_gates: DashMap::new(),
            stats: Arc::new(DeliveryStats::new()),
        }
    }

    /// Convenience constructor wiring a [`SourceSet`] as the adapter and
    /// evicting cached descriptors when sources are removed from it.
    pub fn for_sources(sources: Arc<SourceSet>, config: ManagerConfig) -> Self {
        let manager = Self::with_config(sources.clone(), config);
        manager.watch(&sources);
        manager
    }

    /// Evict identity-cache entries when `sources` reports a removal.
    pub fn watch(&self, sources: &SourceSet) {
        sources.add_observer(self.identity.clone());
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn identity_cache(&self) -> &IdentityCache {
        &self.identity
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_handle(&self) -> Arc<DeliveryStats> {
        self.stats.clone()
    }

    // === Interest registry ===

    /// Replace `listener`'s interest set.
    pub fn subscribe<I>(&self, listener: &ListenerRef, interest: I)
    where
        I: IntoIterator<Item = MetricDescriptor>,
    {
        let changes = self.interest.subscribe(listener, interest);
        debug!(listener = ?ListenerId::of(listener), changed = changes.len(), "listener subscribed");
        self.notify_count_changes(changes);
    }

    /// Remove `listener` and all of its interest.
    pub fn unsubscribe(&self, listener: &ListenerRef) {
        if let Some(changes) = self.interest.unsubscribe(listener) {
            debug!(listener = ?ListenerId::of(listener), changed = changes.len(), "listener unsubscribed");
            self.notify_count_changes(changes);
        }
    }

    /// Whether any listener currently wants `metric`.
    ///
    /// Producers call this to skip expensive work before a batch of pushes.
    pub fn has_interest(&self, metric: &MetricDescriptor) -> bool {
        self.interest.has_interest(metric)
    }

    pub fn subscriber_count(&self, metric: &MetricDescriptor) -> usize {
        self.interest.subscriber_count(metric)
    }

    /// Number of registered listeners.
    pub fn subscribers(&self) -> usize {
        self.interest.subscribers()
    }

    pub fn interest_of(&self, listener: &ListenerRef) -> Option<InterestSet> {
        self.interest.interest_of(listener)
    }

    /// Report subscriber counts to the owning sources.
    ///
    /// Reports for one descriptor are serialized and carry the count read
    /// under the gate, so the last report a source sees always matches the
    /// registry even when subscribes and unsubscribes race.
    fn notify_count_changes(&self, changes: Vec<CountChange>) {
        for change in changes {
            let descriptor = change.descriptor;
            let Some(source) = descriptor.source() else {
                continue;
            };
            let gate = self.count_gates.entry(descriptor.clone()).or_default().clone();
            let last_reported = gate.lock();
            let count = self.interest.subscriber_count(&descriptor);
            if last_reported.get() != Some(count) {
                last_reported.set(Some(count));
                if !isolate("subscriber_count_changed", &descriptor, || {
                    source.on_subscriber_count_changed(&descriptor, count);
                }) {
                    self.stats.record_callback_failure();
                }
            }
            if count == 0 {
                // Only drop the gate when no other reporter holds it.
                self.count_gates
                    .remove_if(&descriptor, |_, g| Arc::ptr_eq(g, &gate) && Arc::strong_count(g) == 2);
            }
        }
    }

    // === Observers ===

    /// Register an observer for the "metric created" and "availability
    /// changed" streams.
    pub fn add_observer(&self, observer: Arc<dyn MetricObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Clear interest, cached identities and logged-error state.
    ///
    /// Observers stay registered. Sources are told their subscriber counts
    /// dropped to zero.
    pub fn reset(&self) {
        let changes = self.interest.clear();
        self.identity.clear();
        self.logged_errors.clear();
        self.stats.reset();
        self.notify_count_changes(changes);
        debug!("metric manager reset");
    }
}

/// Last subscriber count reported for a descriptor. Re-entrant so a source
/// may subscribe from inside its own count callback.
type CountGate = Arc<ReentrantMutex<Cell<Option<usize>>>>;

/// Run collaborator code, containing any panic. Returns `false` if it panicked.
pub(crate) fn isolate<F: FnOnce()>(callback: &'static str, metric: &MetricDescriptor, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            warn!(
                callback,
                metric = %metric.full_name(),
                panic = panic_message(payload.as_ref()),
                "callback panicked; continuing"
            );
            false
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{MetricSource, SourceRef};
    use crate::metric::MetricMember;

    struct Grumpy;

    impl MetricSource for Grumpy {
        fn display_name(&self) -> String {
            "Grumpy".into()
        }

        fn on_subscriber_count_changed(&self, _metric: &MetricDescriptor, _count: usize) {
            panic!("count callback failure");
        }
    }

    struct Quiet;

    impl MetricListener for Quiet {
        fn on_metric(&self, _metric: &crate::metric::MetricValue) {}
    }

    #[test]
    fn panic_message_extracts_text() {
        let payload = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 1");
    }

    #[test]
    fn manager_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MetricManager>();
    }

    #[test]
    fn count_callback_panic_is_counted() {
        let manager = MetricManager::new(Arc::new(SourceSet::new()));
        let source: SourceRef = Arc::new(Grumpy);
        let metric = MetricDescriptor::new(
            MetricMember::property::<Grumpy, _, _>("Mood", |_: &Grumpy| 1.0),
            "Grumpy",
            &source,
        );
        let listener: ListenerRef = Arc::new(Quiet);

        manager.subscribe(&listener, [metric.clone()]);
        assert!(manager.has_interest(&metric));
        manager.unsubscribe(&listener);
        assert!(!manager.has_interest(&metric));
        assert_eq!(manager.stats().callback_failures, 2);
    }
}
