//! Delivery statistics manager.
//!
//! Atomic counters describing what the manager itself has done. Relaxed
//! ordering throughout; exact cross-counter consistency is not required.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters updated by the push and poll pipelines.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    pushes: AtomicU64,
    deliveries: AtomicU64,
    poll_cycles: AtomicU64,
    values_sampled: AtomicU64,
    callback_failures: AtomicU64,
    sampling_errors: AtomicU64,
    listener_panics: AtomicU64,
    observer_panics: AtomicU64,
    last_cycle_micros: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StatsSnapshot {
    pub pushes: u64,
    pub deliveries: u64,
    pub poll_cycles: u64,
    pub values_sampled: u64,
    pub callback_failures: u64,
    pub sampling_errors: u64,
    pub listener_panics: u64,
    pub observer_panics: u64,
    pub last_cycle_micros: u64,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_push(&self, delivered: usize) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn record_deliveries(&self, delivered: usize) {
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn record_sampled(&self, count: usize) {
        self.values_sampled.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_callback_failure(&self) {
        self.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sampling_error(&self) {
        self.sampling_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_listener_panic(&self) {
        self.listener_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_observer_panics(&self, count: usize) {
        self.observer_panics.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Count a completed poll cycle and remember its duration.
    pub fn record_cycle(&self, elapsed: Duration) {
        self.poll_cycles.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.last_cycle_micros.store(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pushes: self.pushes.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            poll_cycles: self.poll_cycles.load(Ordering::Relaxed),
            values_sampled: self.values_sampled.load(Ordering::Relaxed),
            callback_failures: self.callback_failures.load(Ordering::Relaxed),
            sampling_errors: self.sampling_errors.load(Ordering::Relaxed),
            listener_panics: self.listener_panics.load(Ordering::Relaxed),
            observer_panics: self.observer_panics.load(Ordering::Relaxed),
            last_cycle_micros: self.last_cycle_micros.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.pushes,
            &self.deliveries,
            &self.poll_cycles,
            &self.values_sampled,
            &self.callback_failures,
            &self.sampling_errors,
            &self.listener_panics,
            &self.observer_panics,
            &self.last_cycle_micros,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
