//! Metric data model.
//!
//! - [`kind`]: delivery kind and the value type model
//! - [`attributes`]: unit, range and poll hints
//! - [`member`]: property-backed and synthetic metric members
//! - [`descriptor`]: metric identity
//! - [`value`]: timestamped values

pub mod attributes;
pub mod descriptor;
pub mod kind;
pub mod member;
pub mod value;

pub use attributes::{MetricAttributes, Range, SuggestedInitialState};
pub use descriptor::MetricDescriptor;
pub use kind::{MetricKind, MetricType, TypeDescriptor, ValueKind, ValueType};
pub use member::{MemberKey, MetricDeclaration, MetricMember, Sample, SampledValue};
pub use value::{MetricPayload, MetricValue};
