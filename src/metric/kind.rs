//! Metric kinds and the value type model.

use std::fmt;

/// Whether a metric is sampled on demand, pushed out of band, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetricKind {
    /// Can be polled.
    #[default]
    Poll,
    /// Published out of band by its producer.
    Push,
    /// Can be polled and pushed.
    PushPoll,
}

impl MetricKind {
    #[inline]
    pub fn is_poll(self) -> bool {
        matches!(self, Self::Poll | Self::PushPoll)
    }

    #[inline]
    pub fn is_push(self) -> bool {
        matches!(self, Self::Push | Self::PushPoll)
    }
}

/// The value family a metric reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Double,
    Boolean,
    String,
    Unknown,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Declared type of a metric: a value family plus a nullable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricType {
    pub value: ValueType,
    pub nullable: bool,
}

impl MetricType {
    pub const DOUBLE: Self = Self::new(ValueType::Double, false);
    pub const BOOLEAN: Self = Self::new(ValueType::Boolean, false);
    pub const STRING: Self = Self::new(ValueType::String, false);
    pub const UNKNOWN: Self = Self::new(ValueType::Unknown, false);

    pub const fn new(value: ValueType, nullable: bool) -> Self {
        Self { value, nullable }
    }

    pub const fn nullable(self) -> Self {
        Self::new(self.value, true)
    }

    pub fn is_supported(self) -> bool {
        self.value != ValueType::Unknown
    }

    /// Whether a metric of this type may report "no value".
    ///
    /// String metrics tolerate a missing value without carrying the nullable flag.
    pub fn accepts_empty(self) -> bool {
        self.nullable || self.value == ValueType::String
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Runtime description of a Rust value type, as declared by a metric member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Integer,
    Boolean,
    Text,
    /// Any type without a metric mapping, carrying its name for diagnostics.
    Opaque(String),
}

/// Value kind plus nullability; maps onto a [`MetricType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::new(ValueKind::Opaque(type_name.into()))
    }

    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Resolve the metric type this Rust type reports as.
    pub fn metric_type(&self) -> MetricType {
        let value = match self.kind {
            ValueKind::Float | ValueKind::Integer => ValueType::Double,
            ValueKind::Boolean => ValueType::Boolean,
            ValueKind::Text => ValueType::String,
            ValueKind::Opaque(_) => ValueType::Unknown,
        };
        MetricType::new(value, self.nullable)
    }

    /// Name used in error messages.
    pub fn type_name(&self) -> String {
        let base = match &self.kind {
            ValueKind::Float => "float",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "bool",
            ValueKind::Text => "string",
            ValueKind::Opaque(name) => name.as_str(),
        };
        if self.nullable {
            format!("Option<{base}>")
        } else {
            base.to_string()
        }
    }
}
