//! Metric members: the value-producing slot behind a descriptor.
//!
//! A member is either declared by a source type (property-backed, read
//! through a typed getter) or created at runtime by dynamic registration
//! (synthetic, backed by a sampling closure). Discovery and sampling treat
//! both the same way through [`MetricMember::get_value`].

use super::attributes::MetricAttributes;
use super::kind::{MetricKind, TypeDescriptor, ValueKind};
use crate::discovery::{AsAny, MetricSource};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A value read from a member at sampling time.
#[derive(Debug, Clone, PartialEq)]
pub enum SampledValue {
    Double(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    Null,
    /// A value with no metric mapping, carrying its type name.
    Unsupported(&'static str),
}

impl SampledValue {
    /// Short variant label for diagnostics.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Double(_) => "double",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "bool",
            Self::Text(_) => "string",
            Self::Null => "null",
            Self::Unsupported(name) => *name,
        }
    }
}

/// Rust types that can back a metric.
pub trait Sample: 'static {
    fn descriptor() -> TypeDescriptor;
    fn into_sampled(self) -> SampledValue;
}

macro_rules! impl_sample_float {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new(ValueKind::Float)
            }
            fn into_sampled(self) -> SampledValue {
                SampledValue::Double(self as f64)
            }
        }
    )*};
}

macro_rules! impl_sample_int {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new(ValueKind::Integer)
            }
            fn into_sampled(self) -> SampledValue {
                i64::try_from(self).map_or(SampledValue::Double(self as f64), SampledValue::Integer)
            }
        }
    )*};
}

impl_sample_float!(f32, f64);
impl_sample_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Sample for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(ValueKind::Boolean)
    }
    fn into_sampled(self) -> SampledValue {
        SampledValue::Boolean(self)
    }
}

impl Sample for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(ValueKind::Text)
    }
    fn into_sampled(self) -> SampledValue {
        SampledValue::Text(self)
    }
}

impl Sample for &'static str {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(ValueKind::Text)
    }
    fn into_sampled(self) -> SampledValue {
        SampledValue::Text(self.to_owned())
    }
}

impl<T: Sample> Sample for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor().into_nullable()
    }
    fn into_sampled(self) -> SampledValue {
        match self {
            Some(v) => v.into_sampled(),
            None => SampledValue::Null,
        }
    }
}

/// Stable identity of a member, used for descriptor equality and as the
/// identity-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKey {
    /// A member declared by a source type.
    Property { declaring: TypeId, name: String },
    /// A member created by dynamic registration.
    Synthetic(u64),
}

static NEXT_SYNTHETIC_ID: AtomicU64 = AtomicU64::new(1);

impl MemberKey {
    fn next_synthetic() -> Self {
        Self::Synthetic(NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Metric declaration: optional name and group overrides and the delivery kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricDeclaration {
    pub name: Option<String>,
    pub group: Option<String>,
    pub kind: MetricKind,
}

type PropertyGetter = Arc<dyn Fn(&dyn Any) -> SampledValue + Send + Sync>;
type Sampler = Arc<dyn Fn() -> SampledValue + Send + Sync>;

#[derive(Clone)]
enum Backing {
    Property {
        declaring_name: &'static str,
        getter: PropertyGetter,
    },
    Synthetic {
        sampler: Option<Sampler>,
    },
}

/// A value-producing slot on a metric source.
#[derive(Clone)]
pub struct MetricMember {
    key: MemberKey,
    name: String,
    declaration: MetricDeclaration,
    type_descriptor: TypeDescriptor,
    attributes: MetricAttributes,
    backing: Backing,
}

impl MetricMember {
    /// Declare a property-backed metric on source type `S`.
    pub fn property<S, T, F>(name: impl Into<String>, getter: F) -> Self
    where
        S: MetricSource,
        T: Sample,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::property_with_type::<S, _>(name, T::descriptor(), move |s| getter(s).into_sampled())
    }

    /// Declare a property-backed metric with an explicit type descriptor.
    ///
    /// Members whose descriptor has no metric mapping are skipped by discovery.
    pub fn property_with_type<S, F>(
        name: impl Into<String>,
        type_descriptor: TypeDescriptor,
        getter: F,
    ) -> Self
    where
        S: MetricSource,
        F: Fn(&S) -> SampledValue + Send + Sync + 'static,
    {
        let name = name.into();
        let declaring_name = std::any::type_name::<S>();
        let getter: PropertyGetter = Arc::new(move |any: &dyn Any| match any.downcast_ref::<S>() {
            Some(source) => getter(source),
            None => SampledValue::Unsupported("mismatched source"),
        });
        Self {
            key: MemberKey::Property {
                declaring: TypeId::of::<S>(),
                name: name.clone(),
            },
            name,
            declaration: MetricDeclaration::default(),
            type_descriptor,
            attributes: MetricAttributes::default(),
            backing: Backing::Property {
                declaring_name,
                getter,
            },
        }
    }

    /// Create a function-backed member. A push-only member has no sampler
    /// and yields [`SampledValue::Null`] until a value is pushed.
    pub(crate) fn synthetic(
        declaration: MetricDeclaration,
        type_descriptor: TypeDescriptor,
        sampler: Option<Sampler>,
    ) -> Self {
        Self {
            key: MemberKey::next_synthetic(),
            name: declaration.name.clone().unwrap_or_default(),
            declaration,
            type_descriptor,
            attributes: MetricAttributes::default(),
            backing: Backing::Synthetic { sampler },
        }
    }

    /// Override the metric name (defaults to the member name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.declaration.name = Some(name.into());
        self
    }

    /// Override the group (defaults to the source's display name).
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.declaration.group = Some(group.into());
        self
    }

    pub fn kind(mut self, kind: MetricKind) -> Self {
        self.declaration.kind = kind;
        self
    }

    pub fn attributes(mut self, attributes: MetricAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn key(&self) -> &MemberKey {
        &self.key
    }

    /// The member identifier (property name for declared members).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the metric is published under.
    pub fn metric_name(&self) -> &str {
        self.declaration.name.as_deref().unwrap_or(&self.name)
    }

    pub fn declaration(&self) -> &MetricDeclaration {
        &self.declaration
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn metadata(&self) -> &MetricAttributes {
        &self.attributes
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.backing, Backing::Synthetic { .. })
    }

    /// Read the member's current value from its owning source.
    pub fn get_value(&self, source: &dyn MetricSource) -> SampledValue {
        match &self.backing {
            Backing::Property { getter, .. } => getter(AsAny::as_any(source)),
            Backing::Synthetic { sampler } => sampler.as_ref().map_or(SampledValue::Null, |f| f()),
        }
    }
}

impl fmt::Debug for MetricMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("MetricMember");
        d.field("name", &self.name).field("declaration", &self.declaration);
        match &self.backing {
            Backing::Property { declaring_name, .. } => d.field("declaring", declaring_name),
            Backing::Synthetic { sampler } => d.field("sampled", &sampler.is_some()),
        };
        d.field("type", &self.type_descriptor).finish()
    }
}
