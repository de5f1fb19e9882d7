//! Metric descriptors: identity and metadata of one measurable quantity.

use super::attributes::MetricAttributes;
use super::kind::{MetricKind, MetricType};
use super::member::{MemberKey, MetricMember, SampledValue};
use crate::discovery::{MetricSource, SourceId, SourceRef};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct DescriptorInner {
    name: String,
    group: String,
    kind: MetricKind,
    metric_type: MetricType,
    member: MetricMember,
    source: Weak<dyn MetricSource>,
    source_id: SourceId,
    available: AtomicBool,
}

/// Identity and metadata of one metric.
///
/// Cloning is cheap and clones share the mutable availability flag, so a
/// descriptor handed out by the identity cache observes later
/// [`set_availability`](crate::MetricManager::set_availability) calls.
///
/// Two descriptors are equal iff group, name, member and source are equal.
/// Availability takes no part in equality or hashing.
#[derive(Clone)]
pub struct MetricDescriptor {
    inner: Arc<DescriptorInner>,
}

impl MetricDescriptor {
    /// Build a descriptor for `member` on `source`, published under `group`.
    ///
    /// The source is held weakly: a source may own its own descriptors.
    pub fn new(member: MetricMember, group: impl Into<String>, source: &SourceRef) -> Self {
        let metric_type = member.type_descriptor().metric_type();
        Self {
            inner: Arc::new(DescriptorInner {
                name: member.metric_name().to_string(),
                group: group.into(),
                kind: member.declaration().kind,
                metric_type,
                member,
                source: Arc::downgrade(source),
                source_id: SourceId::of(source),
                available: AtomicBool::new(true),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// `"{group} / {name}"`.
    pub fn full_name(&self) -> String {
        format!("{} / {}", self.inner.group, self.inner.name)
    }

    pub fn kind(&self) -> MetricKind {
        self.inner.kind
    }

    pub fn metric_type(&self) -> MetricType {
        self.inner.metric_type
    }

    pub fn attributes(&self) -> &MetricAttributes {
        self.inner.member.metadata()
    }

    pub fn member(&self) -> &MetricMember {
        &self.inner.member
    }

    pub fn member_key(&self) -> &MemberKey {
        self.inner.member.key()
    }

    pub fn source_id(&self) -> SourceId {
        self.inner.source_id
    }

    /// The owning source, if it is still alive.
    pub fn source(&self) -> Option<SourceRef> {
        self.inner.source.upgrade()
    }

    pub fn is_source_alive(&self) -> bool {
        self.inner.source.strong_count() > 0
    }

    /// Whether a push metric currently has a value. Always `true` for
    /// metrics that were never marked unavailable.
    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::Acquire)
    }

    pub(crate) fn set_available(&self, available: bool) -> bool {
        self.inner.available.swap(available, Ordering::AcqRel)
    }

    /// Read the current value through the member. `None` if the source is gone.
    pub fn sample(&self) -> Option<SampledValue> {
        let source = self.source()?;
        Some(self.inner.member.get_value(source.as_ref()))
    }

    /// Whether both handles point at the same cached instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for MetricDescriptor {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let (a, b) = (&self.inner, &other.inner);
        a.group == b.group
            && a.name == b.name
            && a.member.key() == b.member.key()
            && a.source_id == b.source_id
    }
}

impl Eq for MetricDescriptor {}

impl Hash for MetricDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
        self.inner.group.hash(state);
        self.inner.member.key().hash(state);
        self.inner.source_id.hash(state);
    }
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metric: {} / {}", self.inner.group, self.inner.name)
    }
}

impl fmt::Debug for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDescriptor")
            .field("group", &self.inner.group)
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("type", &self.inner.metric_type)
            .field("source", &self.inner.source_id)
            .field("available", &self.is_available())
            .finish()
    }
}
