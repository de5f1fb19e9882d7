//! Integration test common infrastructure.
//!
//! Provides test metric sources, a recording listener, and manager setup.

pub mod listener;
pub mod sources;

#[allow(unused_imports)]
pub use listener::{PanickingListener, RecordingListener};
#[allow(unused_imports)]
pub use sources::{
    DynamicMetricProvider, FailingSource, FullMetricSource, IdleInstrument, TestMetricSource,
};

use metricd::{ManagerConfig, MetricManager, SourceSet};
use std::sync::Arc;

/// A fresh source set and a manager watching it.
#[allow(dead_code)]
pub fn setup() -> (Arc<SourceSet>, MetricManager) {
    setup_with(ManagerConfig::default())
}

#[allow(dead_code)]
pub fn setup_with(config: ManagerConfig) -> (Arc<SourceSet>, MetricManager) {
    let sources = Arc::new(SourceSet::new());
    let manager = MetricManager::for_sources(sources.clone(), config);
    (sources, manager)
}
