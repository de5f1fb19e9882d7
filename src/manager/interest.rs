//! Interest registry: which listener wants which metrics.
//!
//! The table is guarded by a single `parking_lot::RwLock` that is held only
//! for the table operation itself, never while listener or source code runs.
//! A reverse index (descriptor -> number of interested listeners) makes
//! `has_interest` an O(1) read and provides the subscriber-count changes
//! reported to sources.

use crate::metric::{MetricDescriptor, MetricValue};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Receives metric values for the metrics it subscribed to.
pub trait MetricListener: Send + Sync {
    fn on_metric(&self, metric: &MetricValue);
}

/// Shared handle to a listener. Its allocation is the subscriber identity.
pub type ListenerRef = Arc<dyn MetricListener>;

/// Identity of a subscribed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    pub fn of(listener: &ListenerRef) -> Self {
        Self(Arc::as_ptr(listener).cast::<()>() as usize)
    }
}

/// A listener's interest set.
pub type InterestSet = Arc<HashSet<MetricDescriptor>>;

/// New number of interested listeners for a descriptor.
#[derive(Debug, Clone)]
pub struct CountChange {
    pub descriptor: MetricDescriptor,
    pub count: usize,
}

struct Subscription {
    listener: ListenerRef,
    interest: InterestSet,
}

#[derive(Default)]
struct InterestTable {
    subscriptions: HashMap<ListenerId, Subscription>,
    counts: HashMap<MetricDescriptor, usize>,
}

impl InterestTable {
    fn increment(&mut self, descriptor: &MetricDescriptor, changes: &mut Vec<CountChange>) {
        let count = self.counts.entry(descriptor.clone()).or_insert(0);
        *count += 1;
        changes.push(CountChange {
            descriptor: descriptor.clone(),
            count: *count,
        });
    }

    fn decrement(&mut self, descriptor: &MetricDescriptor, changes: &mut Vec<CountChange>) {
        let remaining = match self.counts.get_mut(descriptor) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => return,
        };
        if remaining == 0 {
            self.counts.remove(descriptor);
        }
        changes.push(CountChange {
            descriptor: descriptor.clone(),
            count: remaining,
        });
    }
}

/// Listener subscriptions and the derived interest index.
#[derive(Default)]
pub struct InterestRegistry {
    table: RwLock<InterestTable>,
}

impl InterestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `listener`'s interest set. An empty set keeps the listener
    /// registered with no interest.
    pub fn subscribe<I>(&self, listener: &ListenerRef, interest: I) -> Vec<CountChange>
    where
        I: IntoIterator<Item = MetricDescriptor>,
    {
        let new: HashSet<MetricDescriptor> = interest.into_iter().collect();
        let id = ListenerId::of(listener);
        let mut changes = Vec::new();

        let mut table = self.table.write();
        let old = table.subscriptions.remove(&id).map(|s| s.interest);
        if let Some(old) = &old {
            for descriptor in old.difference(&new) {
                table.decrement(descriptor, &mut changes);
            }
        }
        for descriptor in &new {
            if !old.as_ref().is_some_and(|o| o.contains(descriptor)) {
                table.increment(descriptor, &mut changes);
            }
        }
        table.subscriptions.insert(
            id,
            Subscription {
                listener: listener.clone(),
                interest: Arc::new(new),
            },
        );
        changes
    }

    /// Remove `listener` entirely. `None` if it was not subscribed.
    pub fn unsubscribe(&self, listener: &ListenerRef) -> Option<Vec<CountChange>> {
        let mut table = self.table.write();
        let removed = table.subscriptions.remove(&ListenerId::of(listener))?;
        let mut changes = Vec::new();
        for descriptor in removed.interest.iter() {
            table.decrement(descriptor, &mut changes);
        }
        Some(changes)
    }

    /// True iff at least one listener's set contains an equal descriptor.
    pub fn has_interest(&self, descriptor: &MetricDescriptor) -> bool {
        self.table.read().counts.contains_key(descriptor)
    }

    pub fn subscriber_count(&self, descriptor: &MetricDescriptor) -> usize {
        self.table.read().counts.get(descriptor).copied().unwrap_or(0)
    }

    /// Number of registered listeners, including those with an empty set.
    pub fn subscribers(&self) -> usize {
        self.table.read().subscriptions.len()
    }

    pub fn is_subscribed(&self, listener: &ListenerRef) -> bool {
        self.table.read().subscriptions.contains_key(&ListenerId::of(listener))
    }

    pub fn interest_of(&self, listener: &ListenerRef) -> Option<InterestSet> {
        self.table
            .read()
            .subscriptions
            .get(&ListenerId::of(listener))
            .map(|s| s.interest.clone())
    }

    /// Listeners currently interested in `descriptor`.
    pub fn listeners_for(&self, descriptor: &MetricDescriptor) -> Vec<ListenerRef> {
        let table = self.table.read();
        if !table.counts.contains_key(descriptor) {
            return Vec::new();
        }
        table
            .subscriptions
            .values()
            .filter(|s| s.interest.contains(descriptor))
            .map(|s| s.listener.clone())
            .collect()
    }

    /// Consistent copy of every subscription.
    pub fn snapshot(&self) -> Vec<(ListenerRef, InterestSet)> {
        self.table
            .read()
            .subscriptions
            .values()
            .map(|s| (s.listener.clone(), s.interest.clone()))
            .collect()
    }

    /// Remove every subscription.
    pub fn clear(&self) -> Vec<CountChange> {
        let mut table = self.table.write();
        table.subscriptions.clear();
        table
            .counts
            .drain()
            .map(|(descriptor, _)| CountChange {
                descriptor,
                count: 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{MetricSource, SourceRef};
    use crate::metric::MetricMember;

    struct Box2;

    impl MetricSource for Box2 {
        fn display_name(&self) -> String {
            "Box".into()
        }
    }

    struct Sink;

    impl MetricListener for Sink {
        fn on_metric(&self, _metric: &MetricValue) {}
    }

    fn metric(source: &SourceRef, name: &str) -> MetricDescriptor {
        MetricDescriptor::new(
            MetricMember::property::<Box2, _, _>(name, |_: &Box2| 1.0),
            "Box",
            source,
        )
    }

    #[test]
    fn subscribe_replaces_previous_set() {
        let registry = InterestRegistry::new();
        let source: SourceRef = Arc::new(Box2);
        let (a, b) = (metric(&source, "A"), metric(&source, "B"));
        let listener: ListenerRef = Arc::new(Sink);

        registry.subscribe(&listener, [a.clone()]);
        registry.subscribe(&listener, [b.clone()]);
        assert!(!registry.has_interest(&a));
        assert!(registry.has_interest(&b));
        assert_eq!(registry.subscribers(), 1);
    }

    #[test]
    fn interest_is_or_across_listeners() {
        let registry = InterestRegistry::new();
        let source: SourceRef = Arc::new(Box2);
        let a = metric(&source, "A");
        let first: ListenerRef = Arc::new(Sink);
        let second: ListenerRef = Arc::new(Sink);

        registry.subscribe(&first, [a.clone()]);
        registry.subscribe(&second, [a.clone()]);
        assert_eq!(registry.subscriber_count(&a), 2);

        registry.subscribe(&first, []);
        assert!(registry.has_interest(&a));
        assert!(registry.is_subscribed(&first));

        registry.unsubscribe(&second);
        assert!(!registry.has_interest(&a));
        assert_eq!(registry.subscribers(), 1);
    }

    #[test]
    fn count_changes_report_new_totals() {
        let registry = InterestRegistry::new();
        let source: SourceRef = Arc::new(Box2);
        let a = metric(&source, "A");
        let first: ListenerRef = Arc::new(Sink);
        let second: ListenerRef = Arc::new(Sink);

        let changes = registry.subscribe(&first, [a.clone()]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].count, 1);

        let changes = registry.subscribe(&second, [a.clone()]);
        assert_eq!(changes[0].count, 2);

        // Re-subscribing with the same set changes nothing.
        assert!(registry.subscribe(&second, [a.clone()]).is_empty());

        let changes = registry.unsubscribe(&first).unwrap();
        assert_eq!(changes[0].count, 1);
        assert!(registry.unsubscribe(&first).is_none());
    }

    #[test]
    fn listeners_for_only_returns_interested() {
        let registry = InterestRegistry::new();
        let source: SourceRef = Arc::new(Box2);
        let (a, b) = (metric(&source, "A"), metric(&source, "B"));
        let first: ListenerRef = Arc::new(Sink);
        let second: ListenerRef = Arc::new(Sink);
        registry.subscribe(&first, [a.clone()]);
        registry.subscribe(&second, [b.clone()]);

        let found = registry.listeners_for(&a);
        assert_eq!(found.len(), 1);
        assert_eq!(ListenerId::of(&found[0]), ListenerId::of(&first));
    }

    #[test]
    fn clear_zeroes_every_count() {
        let registry = InterestRegistry::new();
        let source: SourceRef = Arc::new(Box2);
        let a = metric(&source, "A");
        let listener: ListenerRef = Arc::new(Sink);
        registry.subscribe(&listener, [a.clone()]);
        let changes = registry.clear();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].count, 0);
        assert!(!registry.has_interest(&a));
        assert_eq!(registry.subscribers(), 0);
    }
}
