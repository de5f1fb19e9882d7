//! Metric sources and the discovery adapter.
//!
//! The manager never instantiates sources itself. A [`DiscoveryAdapter`]
//! supplies the currently active sources, and each [`MetricSource`]
//! describes its declared metric members. [`SourceSet`] is the in-process
//! adapter used by the daemon and the tests.

mod source_set;

pub use source_set::{SourceSet, SourceSetObserver};

use crate::error::SourceError;
use crate::metric::{MetricDescriptor, MetricMember};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Upcast helper so property getters can downcast a source to its concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object capable of producing metric values.
///
/// Only `display_name` is required. The optional capabilities default to
/// no-ops: a source that wants to refresh its properties before they are
/// sampled overrides [`handles_poll`](Self::handles_poll) and
/// [`on_poll_metrics`](Self::on_poll_metrics).
pub trait MetricSource: AsAny + Send + Sync + 'static {
    /// Display name; the default group for the source's metrics.
    fn display_name(&self) -> String;

    /// Metric members declared by this source's type.
    fn declared_metrics(&self) -> Vec<MetricMember> {
        Vec::new()
    }

    /// Extra descriptors synthesized outside of declared members.
    ///
    /// Read on every discovery call.
    fn additional_metrics(&self) -> Vec<MetricDescriptor> {
        Vec::new()
    }

    /// Whether this source implements the poll-notification capability.
    fn handles_poll(&self) -> bool {
        false
    }

    /// Called once per poll, right before the given descriptors are sampled.
    fn on_poll_metrics(&self, _metrics: &[MetricDescriptor]) -> Result<(), SourceError> {
        Ok(())
    }

    /// Called when the number of listeners interested in one of this
    /// source's metrics changes.
    fn on_subscriber_count_changed(&self, _metric: &MetricDescriptor, _count: usize) {}
}

/// Shared handle to a metric source.
pub type SourceRef = Arc<dyn MetricSource>;

/// Identity of a source object, derived from its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(usize);

impl SourceId {
    pub fn of(source: &SourceRef) -> Self {
        Self(Arc::as_ptr(source).cast::<()>() as usize)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Supplies the set of currently active metric sources.
pub trait DiscoveryAdapter: Send + Sync {
    fn active_sources(&self) -> Vec<SourceRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl MetricSource for Plain {
        fn display_name(&self) -> String {
            "Plain".into()
        }
    }

    #[test]
    fn source_id_tracks_allocation() {
        let a: SourceRef = Arc::new(Plain);
        let b: SourceRef = Arc::new(Plain);
        assert_eq!(SourceId::of(&a), SourceId::of(&a.clone()));
        assert_ne!(SourceId::of(&a), SourceId::of(&b));
    }

    #[test]
    fn default_capabilities_are_inert() {
        let plain = Plain;
        assert!(!plain.handles_poll());
        assert!(plain.declared_metrics().is_empty());
        assert!(plain.additional_metrics().is_empty());
        assert!(plain.on_poll_metrics(&[]).is_ok());
    }

    #[test]
    fn as_any_downcasts_through_trait_object() {
        let source: SourceRef = Arc::new(Plain);
        assert!(AsAny::as_any(source.as_ref()).downcast_ref::<Plain>().is_some());
    }
}
