//! Metadata attached to a metric declaration.

use serde::Serialize;
use std::collections::BTreeMap;

/// Hint to pollers whether a metric ought to be enabled by default.
///
/// A UI is free to ignore this hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedInitialState {
    #[default]
    Indifferent,
    Disabled,
    Enabled,
}

/// Optional numeric bounds for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Range {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl Range {
    pub fn new(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self { minimum, maximum }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.minimum.is_none_or(|min| value >= min) && self.maximum.is_none_or(|max| value <= max)
    }
}

/// Metadata attributes of a metric (unit, range hints, poll suggestions).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetricAttributes {
    pub unit: Option<String>,
    pub range: Option<Range>,
    /// Suggested poll rate in seconds.
    pub suggested_poll_rate: Option<u32>,
    pub suggested_initial_state: SuggestedInitialState,
    pub extra: BTreeMap<String, String>,
}

impl MetricAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.range = Some(Range::new(minimum, maximum));
        self
    }

    pub fn poll_rate(mut self, seconds: u32) -> Self {
        self.suggested_poll_rate = Some(seconds);
        self
    }

    pub fn initial_state(mut self, state: SuggestedInitialState) -> Self {
        self.suggested_initial_state = state;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
