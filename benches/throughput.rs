use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use metricd::{
    ListenerRef, ManagerConfig, MetricListener, MetricManager, MetricMember, MetricSource,
    MetricValue, SourceRef, SourceSet,
};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Push fan-out and poll sampling cost, without any I/O in listeners.

struct Counting(AtomicU64);

impl MetricListener for Counting {
    fn on_metric(&self, value: &MetricValue) {
        black_box(value);
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

struct Bench;

impl MetricSource for Bench {
    fn display_name(&self) -> String {
        "Bench".into()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        (0..8_u8)
            .map(|i| MetricMember::property(format!("M{i}"), move |_: &Bench| f64::from(i)))
            .collect()
    }
}

fn push_fanout_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");

    for listeners in [1_usize, 8, 64] {
        let manager = MetricManager::new(Arc::new(SourceSet::new()));
        let owner: SourceRef = Arc::new(Bench);
        let metric = manager
            .create_push_metric::<f64>(&owner, "Pushed", "Bench")
            .expect("create push metric");
        let subscribed: Vec<ListenerRef> = (0..listeners)
            .map(|_| Arc::new(Counting(AtomicU64::new(0))) as ListenerRef)
            .collect();
        for listener in &subscribed {
            manager.subscribe(listener, vec![metric.clone()]);
        }

        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(BenchmarkId::new("fanout", listeners), &listeners, |b, _| {
            b.iter(|| manager.push_double(&metric, black_box(1.5)))
        });
    }

    let manager = MetricManager::new(Arc::new(SourceSet::new()));
    let owner: SourceRef = Arc::new(Bench);
    let metric = manager
        .create_push_metric::<f64>(&owner, "Unwatched", "Bench")
        .expect("create push metric");
    group.bench_function("no_interest", |b| {
        b.iter(|| manager.push_double(&metric, black_box(1.5)))
    });

    group.finish();
}

fn poll_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll");

    for sources_count in [1_usize, 16] {
        for parallel_poll in [false, true] {
            let sources = Arc::new(SourceSet::new());
            for _ in 0..sources_count {
                sources.add(Arc::new(Bench));
            }
            let manager = MetricManager::for_sources(
                sources.clone(),
                ManagerConfig {
                    parallel_poll,
                    ..ManagerConfig::default()
                },
            );
            let listener: ListenerRef = Arc::new(Counting(AtomicU64::new(0)));
            manager.subscribe(&listener, manager.enumerate_metric_descriptors());

            let label = if parallel_poll { "parallel" } else { "serial" };
            group.throughput(Throughput::Elements((sources_count * 8) as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("dispatch_{label}"), sources_count),
                &sources_count,
                |b, _| b.iter(|| manager.poll_and_dispatch()),
            );
        }
    }

    group.finish();
}

fn discovery_benchmark(c: &mut Criterion) {
    let sources = Arc::new(SourceSet::new());
    for _ in 0..16 {
        sources.add(Arc::new(Bench));
    }
    let manager = MetricManager::for_sources(sources, ManagerConfig::default());

    c.bench_function("enumerate_16_sources", |b| {
        b.iter(|| manager.enumerate_metric_descriptors())
    });
}

criterion_group!(benches, push_fanout_benchmark, poll_benchmark, discovery_benchmark);
criterion_main!(benches);
