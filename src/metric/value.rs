//! Timestamped metric values.

use super::descriptor::MetricDescriptor;
use super::kind::ValueType;
use chrono::{DateTime, Local};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::fmt;

/// The value carried by a [`MetricValue`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MetricPayload {
    Double(f64),
    Boolean(bool),
    String(String),
    /// No current value.
    Empty,
}

impl MetricPayload {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Double(_) => "Double",
            Self::Boolean(_) => "Boolean",
            Self::String(_) => "String",
            Self::Empty => "Empty",
        }
    }

    /// Whether a metric of type `value_type` (nullable or not) can carry this payload.
    pub fn fits(&self, value_type: ValueType, accepts_empty: bool) -> bool {
        match self {
            Self::Double(_) => value_type == ValueType::Double,
            Self::Boolean(_) => value_type == ValueType::Boolean,
            Self::String(_) => value_type == ValueType::String,
            Self::Empty => accepts_empty,
        }
    }
}

impl From<f64> for MetricPayload {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for MetricPayload {
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<i32> for MetricPayload {
    fn from(v: i32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<u32> for MetricPayload {
    fn from(v: u32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<i64> for MetricPayload {
    fn from(v: i64) -> Self {
        Self::Double(v as f64)
    }
}

impl From<bool> for MetricPayload {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<String> for MetricPayload {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for MetricPayload {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<MetricPayload>> From<Option<T>> for MetricPayload {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

impl fmt::Display for MetricPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Empty => Ok(()),
        }
    }
}

/// One sample or event of a metric.
#[derive(Debug, Clone)]
pub struct MetricValue {
    descriptor: MetricDescriptor,
    payload: MetricPayload,
    time: DateTime<Local>,
    metadata: Option<HashMap<String, String>>,
}

impl MetricValue {
    /// Capture a value now.
    pub fn new(descriptor: MetricDescriptor, payload: MetricPayload) -> Self {
        Self {
            descriptor,
            payload,
            time: Local::now(),
            metadata: None,
        }
    }

    pub fn empty(descriptor: MetricDescriptor) -> Self {
        Self::new(descriptor, MetricPayload::Empty)
    }

    pub fn at(mut self, time: DateTime<Local>) -> Self {
        self.time = time;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn payload(&self) -> &MetricPayload {
        &self.payload
    }

    pub fn time(&self) -> DateTime<Local> {
        self.time
    }

    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            MetricPayload::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            MetricPayload::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            MetricPayload::String(v) => Some(v),
            _ => None,
        }
    }

    /// `false` for empty values.
    pub fn is_available(&self) -> bool {
        self.payload != MetricPayload::Empty
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}",
            self.descriptor.full_name(),
            self.payload,
            self.time.format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MetricValue", 5)?;
        s.serialize_field("group", self.descriptor.group())?;
        s.serialize_field("name", self.descriptor.name())?;
        s.serialize_field("value", &self.payload)?;
        s.serialize_field("time", &self.time)?;
        s.serialize_field("metadata", &self.metadata)?;
        s.end()
    }
}
