//! Test metric sources.

#![allow(dead_code)]

use metricd::{
    MetricAttributes, MetricDescriptor, MetricKind, MetricManager, MetricMember, MetricSource,
    SampledValue, SourceError, SourceRef, TypeDescriptor, ValueKind,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

// =============================================================================
// TestMetricSource
// =============================================================================

#[derive(Default)]
struct XyzState {
    x: f64,
    y: f64,
    z: Option<f64>,
    offset: u32,
}

/// Three push/poll doubles; `Z` is nullable.
#[derive(Default)]
pub struct TestMetricSource {
    state: Mutex<XyzState>,
}

impl TestMetricSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Push 100 rounds of X, Y and Z if anyone wants X.
    ///
    /// Z carries a value every 20th round and is empty otherwise.
    pub fn push_burst(self: &Arc<Self>, manager: &MetricManager) -> usize {
        let source: SourceRef = self.clone();
        let (Some(x), Some(y), Some(z)) = (
            manager.descriptor_for(&source, "X"),
            manager.descriptor_for(&source, "Y"),
            manager.descriptor_for(&source, "Z"),
        ) else {
            return 0;
        };
        if !manager.has_interest(&x) {
            return 0;
        }

        let mut delivered = 0;
        for i in 0..100 {
            let (xv, yv) = {
                let mut state = self.state.lock();
                state.offset += 1;
                state.x = f64::from(state.offset);
                state.y = (f64::from(state.offset) * 0.1).sin();
                (state.x, state.y)
            };
            delivered += manager.push(&x, xv).expect("push X");
            delivered += manager.push(&y, yv).expect("push Y");
            delivered += if i % 20 == 0 {
                manager.push(&z, 1.0).expect("push Z")
            } else {
                manager.push_empty(&z).expect("push empty Z")
            };
        }
        delivered
    }
}

impl MetricSource for TestMetricSource {
    fn display_name(&self) -> String {
        "Test Metric Producer".into()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        vec![
            MetricMember::property("X", |s: &Self| s.state.lock().x)
                .kind(MetricKind::PushPoll)
                .attributes(MetricAttributes::new().unit("I")),
            MetricMember::property("Y", |s: &Self| s.state.lock().y)
                .kind(MetricKind::PushPoll)
                .attributes(MetricAttributes::new().unit("V")),
            MetricMember::property("Z", |s: &Self| s.state.lock().z)
                .kind(MetricKind::PushPoll)
                .attributes(MetricAttributes::new().unit("U")),
        ]
    }
}

// =============================================================================
// FullMetricSource
// =============================================================================

/// One member per supported type, plain and nullable. Nullable members
/// and the string start out empty.
#[derive(Default)]
pub struct FullMetricSource {
    string: Option<String>,
}

impl FullMetricSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl MetricSource for FullMetricSource {
    fn display_name(&self) -> String {
        "Full Test Metric Producer".into()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        vec![
            MetricMember::property("DoubleMetric", |_: &Self| 0.0_f64),
            MetricMember::property("DoubleMetricNull", |_: &Self| None::<f64>),
            MetricMember::property("BoolMetric", |_: &Self| false),
            MetricMember::property("BoolMetricNull", |_: &Self| None::<bool>),
            MetricMember::property("IntMetric", |_: &Self| 0_i32),
            MetricMember::property("IntMetricNull", |_: &Self| None::<i32>),
            MetricMember::property_with_type(
                "StringMetric",
                TypeDescriptor::new(ValueKind::Text),
                |s: &Self| s.string.clone().map_or(SampledValue::Null, SampledValue::Text),
            ),
        ]
    }
}

// =============================================================================
// IdleInstrument
// =============================================================================

#[derive(Default)]
struct InstrumentState {
    voltage: f64,
    current: f64,
    id: String,
    test: i32,
    polls: usize,
    last_polled: Vec<String>,
}

/// An instrument named `INST` with renamed poll metrics, an unpolled
/// string, and a push metric `Test` with unit and range.
#[derive(Default)]
pub struct IdleInstrument {
    state: Mutex<InstrumentState>,
}

impl IdleInstrument {
    pub const PUSH_COUNT: usize = 10;

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn polls(&self) -> usize {
        self.state.lock().polls
    }

    /// Member names passed to the most recent poll notification.
    pub fn last_polled(&self) -> Vec<String> {
        self.state.lock().last_polled.clone()
    }

    /// Push [`Self::PUSH_COUNT`] increasing values of `Test` if anyone listens.
    pub fn push_range_values(self: &Arc<Self>, manager: &MetricManager) -> usize {
        let source: SourceRef = self.clone();
        let Some(metric) = manager.descriptor_for(&source, "Test") else {
            return 0;
        };
        if !manager.has_interest(&metric) {
            return 0;
        }
        let mut delivered = 0;
        for _ in 0..Self::PUSH_COUNT {
            let value = {
                let mut state = self.state.lock();
                state.test += 1;
                state.test
            };
            delivered += manager.push(&metric, value).expect("push Test");
        }
        delivered
    }
}

impl MetricSource for IdleInstrument {
    fn display_name(&self) -> String {
        "INST".into()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        vec![
            MetricMember::property("Voltage", |s: &Self| s.state.lock().voltage)
                .named("v")
                .attributes(MetricAttributes::new().unit("V")),
            MetricMember::property("Current", |s: &Self| s.state.lock().current)
                .named("I")
                .attributes(MetricAttributes::new().unit("A")),
            MetricMember::property("Id", |s: &Self| s.state.lock().id.clone()),
            MetricMember::property("Test", |s: &Self| s.state.lock().test)
                .kind(MetricKind::Push)
                .attributes(MetricAttributes::new().unit("cm").range(Some(0.0), None)),
        ]
    }

    fn handles_poll(&self) -> bool {
        true
    }

    fn on_poll_metrics(&self, metrics: &[MetricDescriptor]) -> Result<(), SourceError> {
        let mut state = self.state.lock();
        state.polls += 1;
        state.last_polled = metrics.iter().map(|m| m.member().name().to_string()).collect();
        let t = state.polls as f64;
        state.voltage = (t * 100.0).sin() + 2.5;
        state.current = (t * 100.0).cos() * 0.1 + 1.5;
        state.id = format!("poll-{}", state.polls);
        Ok(())
    }
}

// =============================================================================
// DynamicMetricProvider
// =============================================================================

/// Exposes one dynamic poll metric (`Counter`, incremented on every poll
/// that includes it) and one dynamic push metric (`Pusher`).
pub struct DynamicMetricProvider {
    counter: Arc<Mutex<f64>>,
    poll_metric: OnceLock<MetricDescriptor>,
    push_metric: OnceLock<MetricDescriptor>,
}

impl DynamicMetricProvider {
    pub const GROUP: &'static str = "Dynamic Metric Test";

    pub fn new(manager: &MetricManager) -> Arc<Self> {
        let provider = Arc::new(Self {
            counter: Arc::new(Mutex::new(0.0)),
            poll_metric: OnceLock::new(),
            push_metric: OnceLock::new(),
        });
        let source: SourceRef = provider.clone();

        let counter = provider.counter.clone();
        let poll = manager
            .create_poll_metric(&source, "Counter", Self::GROUP, move || *counter.lock())
            .expect("create Counter");
        let push = manager
            .create_push_metric::<f64>(&source, "Pusher", Self::GROUP)
            .expect("create Pusher");
        let _ = provider.poll_metric.set(poll);
        let _ = provider.push_metric.set(push);
        provider
    }

    pub fn poll_metric(&self) -> MetricDescriptor {
        self.poll_metric.get().cloned().expect("poll metric created")
    }

    pub fn push_metric(&self) -> MetricDescriptor {
        self.push_metric.get().cloned().expect("push metric created")
    }

    pub fn counter(&self) -> f64 {
        *self.counter.lock()
    }

    pub fn push_double(&self, manager: &MetricManager, value: f64) -> usize {
        manager.push(&self.push_metric(), value).expect("push Pusher")
    }
}

impl MetricSource for DynamicMetricProvider {
    fn display_name(&self) -> String {
        "Dynamic Provider".into()
    }

    fn additional_metrics(&self) -> Vec<MetricDescriptor> {
        self.poll_metric
            .get()
            .into_iter()
            .chain(self.push_metric.get())
            .cloned()
            .collect()
    }

    fn handles_poll(&self) -> bool {
        true
    }

    fn on_poll_metrics(&self, metrics: &[MetricDescriptor]) -> Result<(), SourceError> {
        if let Some(poll) = self.poll_metric.get()
            && metrics.contains(poll)
        {
            *self.counter.lock() += 1.0;
        }
        Ok(())
    }
}

// =============================================================================
// FailingSource
// =============================================================================

/// A poll-aware source whose notification fails (or panics) but whose
/// metric still samples, plus subscriber-count bookkeeping.
#[derive(Default)]
pub struct FailingSource {
    pub panic_on_poll: bool,
    callbacks: AtomicUsize,
    counts: Mutex<HashMap<String, Vec<usize>>>,
}

impl FailingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            panic_on_poll: true,
            ..Self::default()
        })
    }

    pub fn callbacks(&self) -> usize {
        self.callbacks.load(Ordering::Relaxed)
    }

    /// Subscriber counts reported for a metric name, in order.
    pub fn counts_for(&self, name: &str) -> Vec<usize> {
        self.counts.lock().get(name).cloned().unwrap_or_default()
    }
}

impl MetricSource for FailingSource {
    fn display_name(&self) -> String {
        "Failing".into()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        vec![
            MetricMember::property("Steady", |_: &Self| 7.0_f64),
            MetricMember::property_with_type(
                "Liar",
                TypeDescriptor::new(ValueKind::Float),
                |_: &Self| SampledValue::Text("not a number".into()),
            ),
        ]
    }

    fn handles_poll(&self) -> bool {
        true
    }

    fn on_poll_metrics(&self, _metrics: &[MetricDescriptor]) -> Result<(), SourceError> {
        self.callbacks.fetch_add(1, Ordering::Relaxed);
        if self.panic_on_poll {
            panic!("poll callback exploded");
        }
        Err("device offline".into())
    }

    fn on_subscriber_count_changed(&self, metric: &MetricDescriptor, count: usize) {
        self.counts
            .lock()
            .entry(metric.name().to_string())
            .or_default()
            .push(count);
    }
}
