//! Identity cache for push-capable descriptors.
//!
//! Discovery re-creates descriptors on every call. Push metrics carry
//! mutable availability, so their descriptors are cached and handed out
//! again instead, keyed by the owning source and member.

use crate::discovery::{SourceId, SourceSetObserver};
use crate::metric::{MemberKey, MetricDescriptor};
use dashmap::DashMap;
use tracing::debug;

type CacheKey = (SourceId, MemberKey);

/// Cached push descriptors.
///
/// Entries for sources that are no longer active are evicted when the
/// [`SourceSet`](crate::SourceSet) reports the removal, or swept once the
/// source has been dropped.
#[derive(Default)]
pub struct IdentityCache {
    entries: DashMap<CacheKey, MetricDescriptor>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_of(descriptor: &MetricDescriptor) -> CacheKey {
        (descriptor.source_id(), descriptor.member_key().clone())
    }

    /// The cached instance for a source member, if any.
    pub fn get(&self, source: SourceId, member: &MemberKey) -> Option<MetricDescriptor> {
        // Clone out so no shard guard outlives the call.
        self.entries.get(&(source, member.clone())).map(|e| e.value().clone())
    }

    /// Return the cached instance equal to `fresh`, or cache `fresh`.
    ///
    /// A cached entry that is no longer equal (e.g. the group changed) is replaced.
    pub fn resolve(&self, fresh: MetricDescriptor) -> MetricDescriptor {
        let mut entry = self.entries.entry(Self::key_of(&fresh)).or_insert_with(|| fresh.clone());
        if *entry.value() != fresh {
            *entry.value_mut() = fresh;
        }
        entry.value().clone()
    }

    /// Insert or overwrite the entry for `descriptor`.
    pub fn store(&self, descriptor: MetricDescriptor) {
        self.entries.insert(Self::key_of(&descriptor), descriptor);
    }

    /// Drop every entry owned by `source`. Returns how many were removed.
    pub fn evict_source(&self, source: SourceId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(owner, _), _| *owner != source);
        before.saturating_sub(self.entries.len())
    }

    /// Drop entries whose source has been deallocated.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, descriptor| descriptor.is_source_alive());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "swept stale identity cache entries");
        }
        removed
    }

    pub fn descriptors(&self) -> Vec<MetricDescriptor> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl SourceSetObserver for IdentityCache {
    fn on_source_removed(&self, source: SourceId) {
        let removed = self.evict_source(source);
        debug!(source = %source, removed, "evicted identity cache entries");
    }
}
