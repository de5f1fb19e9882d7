//! Dynamic metric registration.
//!
//! Producers that synthesize metrics outside of declared members create them
//! here and usually expose the returned descriptors through
//! [`MetricSource::additional_metrics`](crate::MetricSource::additional_metrics).

use super::MetricManager;
use crate::discovery::SourceRef;
use crate::error::{MetricError, MetricResult};
use crate::metric::{
    MetricAttributes, MetricDeclaration, MetricDescriptor, MetricKind, MetricMember, Sample,
    SampledValue, TypeDescriptor,
};
use std::sync::Arc;
use tracing::debug;

type Sampler = Arc<dyn Fn() -> SampledValue + Send + Sync>;

/// Description of a metric to create at runtime.
pub struct DynamicMetric {
    name: String,
    group: String,
    kind: MetricKind,
    type_descriptor: TypeDescriptor,
    attributes: MetricAttributes,
    sampler: Option<Sampler>,
}

impl DynamicMetric {
    /// A metric with a runtime-described value type and no sampler.
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        kind: MetricKind,
        type_descriptor: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            kind,
            type_descriptor,
            attributes: MetricAttributes::default(),
            sampler: None,
        }
    }

    /// A poll metric sampled by calling `sample_fn`.
    pub fn poll<T, F>(name: impl Into<String>, group: impl Into<String>, sample_fn: F) -> Self
    where
        T: Sample,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(name, group, MetricKind::Poll, T::descriptor())
            .sampler(move || sample_fn().into_sampled())
    }

    /// A push metric of type `T`.
    pub fn push<T: Sample>(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self::new(name, group, MetricKind::Push, T::descriptor())
    }

    pub fn sampler<F>(mut self, sample_fn: F) -> Self
    where
        F: Fn() -> SampledValue + Send + Sync + 'static,
    {
        self.sampler = Some(Arc::new(sample_fn));
        self
    }

    pub fn kind(mut self, kind: MetricKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn attributes(mut self, attributes: MetricAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl MetricManager {
    /// Create a poll metric on `owner` backed by `sample_fn`.
    pub fn create_poll_metric<T, F>(
        &self,
        owner: &SourceRef,
        name: impl Into<String>,
        group: impl Into<String>,
        sample_fn: F,
    ) -> MetricResult<MetricDescriptor>
    where
        T: Sample,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.create_metric(owner, DynamicMetric::poll(name, group, sample_fn))
    }

    /// Create a push metric of type `T` on `owner`.
    pub fn create_push_metric<T: Sample>(
        &self,
        owner: &SourceRef,
        name: impl Into<String>,
        group: impl Into<String>,
    ) -> MetricResult<MetricDescriptor> {
        self.create_metric(owner, DynamicMetric::push::<T>(name, group))
    }

    /// Create a metric from a [`DynamicMetric`] description.
    ///
    /// Push-capable metrics are registered in the identity cache, then
    /// observers are told the metric exists so they can subscribe to it.
    pub fn create_metric(
        &self,
        owner: &SourceRef,
        spec: DynamicMetric,
    ) -> MetricResult<MetricDescriptor> {
        let DynamicMetric {
            name,
            group,
            kind,
            type_descriptor,
            attributes,
            sampler,
        } = spec;

        if !type_descriptor.metric_type().is_supported() {
            return Err(MetricError::UnsupportedType {
                type_name: type_descriptor.type_name(),
            });
        }
        if kind.is_poll() && sampler.is_none() {
            return Err(MetricError::InvalidArgument {
                parameter: "sample_fn",
                reason: format!("poll metric '{group} / {name}' requires a sampling function"),
            });
        }

        let declaration = MetricDeclaration {
            name: Some(name),
            group: Some(group.clone()),
            kind,
        };
        let member = MetricMember::synthetic(declaration, type_descriptor, sampler).attributes(attributes);
        let descriptor = MetricDescriptor::new(member, group, owner);

        if kind.is_push() {
            self.identity.store(descriptor.clone());
        }
        debug!(metric = %descriptor.full_name(), kind = ?kind, "metric created");
        self.stats.record_observer_panics(self.observers.metric_created(&descriptor));
        Ok(descriptor)
    }
}
