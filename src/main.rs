//! metricd - metric registry daemon
//!
//! Discovers the built-in sources, subscribes a structured-log sink to their
//! metrics and runs the poll cycle until interrupted.

use metricd::config::{Config, ConfigError, validate};
use metricd::sink::{FollowCreated, LogSink};
use metricd::sources::{HeartbeatSource, ProcessSource};
use metricd::{ListenerRef, MetricManager, SourceSet, SuggestedInitialState, telemetry};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let (config, missing) = match Config::load(&config_path) {
        Ok(config) => (config, false),
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            (Config::default(), true)
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("loading {config_path}"))),
    };

    // Initialize tracing
    telemetry::init(&config.log)?;
    if missing {
        warn!(path = %config_path, "config file not found; using defaults");
    }

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} error(s). See messages above.",
            errors.len()
        ));
    }

    info!(
        poll_ms = config.poll.interval_ms,
        parallel_poll = config.manager.parallel_poll,
        "Starting metricd"
    );

    // Sources and manager
    let sources = Arc::new(SourceSet::new());
    let manager = Arc::new(MetricManager::for_sources(
        sources.clone(),
        config.manager.clone(),
    ));

    if config.sources.process {
        sources.add(Arc::new(ProcessSource::new()));
    }

    // The log sink also follows metrics created at runtime
    let sink = Arc::new(LogSink::new());
    let listener: ListenerRef = sink.clone();
    manager.subscribe(&listener, []);
    let follower = manager.add_observer(Arc::new(FollowCreated::new(&manager, listener.clone())));

    let heartbeat_task = match config.sources.heartbeat() {
        Some(period) => {
            let heartbeat = HeartbeatSource::register(&manager, &sources)?;
            Some(heartbeat.spawn(manager.clone(), period))
        }
        None => None,
    };

    // Subscribe the log sink to everything not suggested off
    let wanted: Vec<_> = manager
        .enumerate_metric_descriptors()
        .into_iter()
        .filter(|m| m.attributes().suggested_initial_state != SuggestedInitialState::Disabled)
        .collect();
    info!(metrics = wanted.len(), sources = sources.len(), "Subscribing log sink");
    manager.subscribe(&listener, wanted);

    // Poll cycle
    let poller = {
        let manager = manager.clone();
        let period = config.poll.interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let manager = manager.clone();
                match tokio::task::spawn_blocking(move || manager.poll_and_dispatch()).await {
                    Ok(report) => tracing::trace!(?report, "poll cycle complete"),
                    Err(e) => error!(error = %e, "poll cycle task failed"),
                }
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    poller.abort();
    if let Some(task) = heartbeat_task {
        task.abort();
    }
    manager.remove_observer(follower);
    manager.unsubscribe(&listener);

    let stats = manager.stats();
    info!(
        poll_cycles = stats.poll_cycles,
        pushes = stats.pushes,
        deliveries = stats.deliveries,
        logged = sink.logged(),
        "metricd stopped"
    );
    Ok(())
}
