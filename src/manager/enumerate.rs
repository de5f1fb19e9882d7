//! Metric discovery.

use super::MetricManager;
use crate::discovery::{SourceId, SourceRef};
use crate::metric::{MetricDescriptor, MetricMember};
use tracing::trace;

impl MetricManager {
    /// Derive the full set of metric descriptors from the active sources.
    ///
    /// Every call re-derives the set. Push-capable descriptors come from the
    /// identity cache so their availability survives repeated discovery.
    pub fn enumerate_metric_descriptors(&self) -> Vec<MetricDescriptor> {
        if self.config.sweep_stale {
            self.identity.sweep();
        }
        let mut descriptors = Vec::new();
        for source in self.adapter.active_sources() {
            self.collect_source(&source, &mut descriptors);
        }
        trace!(count = descriptors.len(), "enumerated metric descriptors");
        descriptors
    }

    /// Descriptors of one source: declared members grouped by group, then
    /// any additional descriptors verbatim.
    pub fn descriptors_of(&self, source: &SourceRef) -> Vec<MetricDescriptor> {
        let mut descriptors = Vec::new();
        self.collect_source(source, &mut descriptors);
        descriptors
    }

    /// Look up one declared metric of `source` by member name.
    ///
    /// Returns the cached instance for push-capable members.
    pub fn descriptor_for(&self, source: &SourceRef, member: &str) -> Option<MetricDescriptor> {
        let declared = source
            .declared_metrics()
            .into_iter()
            .find(|m| m.name() == member)?;
        if !declared.type_descriptor().metric_type().is_supported() {
            return None;
        }
        let group = Self::group_of(source, &declared);
        Some(self.identify(source, declared, group))
    }

    fn collect_source(&self, source: &SourceRef, out: &mut Vec<MetricDescriptor>) {
        let display_name = source.display_name();

        // Group in first-seen order, members in declaration order within a group.
        let mut groups: Vec<(String, Vec<MetricMember>)> = Vec::new();
        for member in source.declared_metrics() {
            if !member.type_descriptor().metric_type().is_supported() {
                trace!(
                    source = %display_name,
                    member = member.name(),
                    member_type = %member.type_descriptor().type_name(),
                    "skipping member with unsupported type"
                );
                continue;
            }
            let group = member
                .declaration()
                .group
                .clone()
                .unwrap_or_else(|| display_name.clone());
            match groups.iter_mut().find(|(name, _)| *name == group) {
                Some((_, members)) => members.push(member),
                None => groups.push((group, vec![member])),
            }
        }

        for (group, members) in groups {
            for member in members {
                out.push(self.identify(source, member, group.clone()));
            }
        }

        out.extend(source.additional_metrics());
    }

    fn group_of(source: &SourceRef, member: &MetricMember) -> String {
        member
            .declaration()
            .group
            .clone()
            .unwrap_or_else(|| source.display_name())
    }

    /// Fresh descriptor for poll-only members, cached instance for push-capable ones.
    fn identify(&self, source: &SourceRef, member: MetricMember, group: String) -> MetricDescriptor {
        let is_push = member.declaration().kind.is_push();
        if is_push {
            if let Some(cached) = self.identity.get(SourceId::of(source), member.key()) {
                if cached.group() == group && cached.name() == member.metric_name() {
                    return cached;
                }
            }
        }
        let fresh = MetricDescriptor::new(member, group, source);
        if is_push {
            self.identity.resolve(fresh)
        } else {
            fresh
        }
    }
}
