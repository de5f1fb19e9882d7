//! Test listeners.

#![allow(dead_code)]

use metricd::{MetricListener, MetricValue};
use parking_lot::Mutex;

/// Records every value it receives.
#[derive(Default)]
pub struct RecordingListener {
    values: Mutex<Vec<MetricValue>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<MetricValue> {
        self.values.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn clear(&self) {
        self.values.lock().clear();
    }

    /// Values received for the metric with this full name.
    pub fn values_of(&self, full_name: &str) -> Vec<MetricValue> {
        self.values
            .lock()
            .iter()
            .filter(|v| v.descriptor().full_name() == full_name)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<MetricValue> {
        self.values.lock().last().cloned()
    }
}

impl MetricListener for RecordingListener {
    fn on_metric(&self, value: &MetricValue) {
        self.values.lock().push(value.clone());
    }
}

/// Panics on every value.
#[derive(Default)]
pub struct PanickingListener;

impl MetricListener for PanickingListener {
    fn on_metric(&self, value: &MetricValue) {
        panic!("listener rejected {}", value.descriptor().full_name());
    }
}
