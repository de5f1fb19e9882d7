//! In-process discovery adapter holding an explicit list of active sources.

use super::{DiscoveryAdapter, SourceId, SourceRef};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Lifecycle notifications for a [`SourceSet`].
pub trait SourceSetObserver: Send + Sync {
    fn on_source_added(&self, _source: &SourceRef) {}
    fn on_source_removed(&self, source: SourceId);
}

/// The set of active metric sources, in registration order.
#[derive(Default)]
pub struct SourceSet {
    sources: RwLock<Vec<SourceRef>>,
    observers: RwLock<Vec<Arc<dyn SourceSetObserver>>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Returns `false` if it was already active.
    pub fn add(&self, source: SourceRef) -> bool {
        let id = SourceId::of(&source);
        {
            let mut sources = self.sources.write();
            if sources.iter().any(|s| SourceId::of(s) == id) {
                return false;
            }
            sources.push(source.clone());
        }
        debug!(source = %source.display_name(), id = %id, "metric source added");
        for observer in self.observers() {
            observer.on_source_added(&source);
        }
        true
    }

    /// Deactivate a source. Returns `false` if it was not active.
    pub fn remove(&self, source: &SourceRef) -> bool {
        let id = SourceId::of(source);
        let removed = {
            let mut sources = self.sources.write();
            let before = sources.len();
            sources.retain(|s| SourceId::of(s) != id);
            sources.len() != before
        };
        if removed {
            debug!(source = %source.display_name(), id = %id, "metric source removed");
            for observer in self.observers() {
                observer.on_source_removed(id);
            }
        }
        removed
    }

    pub fn clear(&self) {
        let drained: Vec<SourceRef> = std::mem::take(&mut *self.sources.write());
        let observers = self.observers();
        for source in &drained {
            let id = SourceId::of(source);
            for observer in &observers {
                observer.on_source_removed(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }

    pub fn contains(&self, source: &SourceRef) -> bool {
        let id = SourceId::of(source);
        self.sources.read().iter().any(|s| SourceId::of(s) == id)
    }

    pub fn add_observer(&self, observer: Arc<dyn SourceSetObserver>) {
        self.observers.write().push(observer);
    }

    fn observers(&self) -> Vec<Arc<dyn SourceSetObserver>> {
        self.observers.read().clone()
    }
}

impl DiscoveryAdapter for SourceSet {
    fn active_sources(&self) -> Vec<SourceRef> {
        self.sources.read().clone()
    }
}
