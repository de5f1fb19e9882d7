//! Unified error handling for metricd.
//!
//! Only failures that are fatal to the calling operation are surfaced as
//! [`MetricError`]. Failures inside collaborator code (source poll callbacks,
//! listeners, observers) are recovered by the manager and logged.

use thiserror::Error;

/// Error a metric source may return from its poll callback.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`MetricManager`](crate::MetricManager) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    /// Dynamic registration with a value type that has no Double/Boolean/String mapping.
    #[error("unsupported metric type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        parameter: &'static str,
        reason: String,
    },

    /// A pushed value cannot be represented by the metric's declared type.
    #[error("metric '{metric}' expects {expected}, got {actual}")]
    ValueTypeMismatch {
        metric: String,
        expected: String,
        actual: &'static str,
    },
}

impl MetricError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::ValueTypeMismatch { .. } => "value_type_mismatch",
        }
    }
}

/// Result type for manager operations.
pub type MetricResult<T> = Result<T, MetricError>;
