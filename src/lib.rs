//! # metricd
//!
//! An in-process metric registry and delivery engine.
//!
//! ## Features
//!
//! - Discovery of metrics declared by registered sources
//! - Stable descriptor identity for push-capable metrics
//! - Declarative interest: each listener states the full set it wants
//! - Synchronous push fan-out and on-demand poll sampling
//! - Dynamic registration of poll and push metrics at runtime
//! - Availability tracking for push metrics
//!
//! ## Quick Start
//!
//! ```rust
//! use metricd::{MetricListener, MetricManager, MetricMember, MetricSource, MetricValue, SourceSet};
//! use std::sync::Arc;
//!
//! struct Thermometer;
//!
//! impl MetricSource for Thermometer {
//!     fn display_name(&self) -> String {
//!         "Thermometer".into()
//!     }
//!
//!     fn declared_metrics(&self) -> Vec<MetricMember> {
//!         vec![MetricMember::property("Celsius", |_: &Thermometer| 21.5)]
//!     }
//! }
//!
//! struct Printer;
//!
//! impl MetricListener for Printer {
//!     fn on_metric(&self, value: &MetricValue) {
//!         println!("{value}");
//!     }
//! }
//!
//! let sources = Arc::new(SourceSet::new());
//! sources.add(Arc::new(Thermometer));
//! let manager = MetricManager::for_sources(sources, Default::default());
//!
//! let metrics = manager.enumerate_metric_descriptors();
//! let listener: metricd::ListenerRef = Arc::new(Printer);
//! manager.subscribe(&listener, metrics);
//!
//! let report = manager.poll_and_dispatch();
//! assert_eq!(report.deliveries, 1);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod manager;
pub mod metric;
pub mod sink;
pub mod sources;
pub mod telemetry;

pub use config::{Config, ConfigError, ManagerConfig};
pub use discovery::{DiscoveryAdapter, MetricSource, SourceId, SourceRef, SourceSet, SourceSetObserver};
pub use error::{MetricError, MetricResult, SourceError};
pub use manager::{
    DynamicMetric, ListenerRef, MetricListener, MetricManager, MetricObserver, ObserverId,
    PollReport, StatsSnapshot,
};
pub use metric::{
    MetricAttributes, MetricDescriptor, MetricKind, MetricMember, MetricPayload, MetricType,
    MetricValue, Range, Sample, SampledValue, SuggestedInitialState, TypeDescriptor, ValueKind,
    ValueType,
};
