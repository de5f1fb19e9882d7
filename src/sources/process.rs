//! Process metrics refreshed on every poll.

use crate::discovery::MetricSource;
use crate::error::SourceError;
use crate::metric::{MetricAttributes, MetricDescriptor, MetricMember};
use parking_lot::RwLock;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    uptime_secs: f64,
    polls: u64,
    status: String,
}

/// Uptime, poll count and status of the running daemon.
#[derive(Debug)]
pub struct ProcessSource {
    started: Instant,
    snapshot: RwLock<Snapshot>,
}

impl Default for ProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            snapshot: RwLock::new(Snapshot {
                status: "starting".to_string(),
                ..Snapshot::default()
            }),
        }
    }

    fn uptime(&self) -> f64 {
        self.snapshot.read().uptime_secs
    }

    fn polls(&self) -> u64 {
        self.snapshot.read().polls
    }

    fn status(&self) -> String {
        self.snapshot.read().status.clone()
    }
}

impl MetricSource for ProcessSource {
    fn display_name(&self) -> String {
        "Process".to_string()
    }

    fn declared_metrics(&self) -> Vec<MetricMember> {
        vec![
            MetricMember::property("Uptime", ProcessSource::uptime)
                .attributes(MetricAttributes::new().unit("s").range(Some(0.0), None)),
            MetricMember::property("Poll Cycles", ProcessSource::polls),
            MetricMember::property("Status", ProcessSource::status),
        ]
    }

    fn handles_poll(&self) -> bool {
        true
    }

    fn on_poll_metrics(&self, _metrics: &[MetricDescriptor]) -> Result<(), SourceError> {
        let mut snapshot = self.snapshot.write();
        snapshot.uptime_secs = self.started.elapsed().as_secs_f64();
        snapshot.polls += 1;
        snapshot.status = "running".to_string();
        Ok(())
    }
}
