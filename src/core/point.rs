use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// A typed field value stored on a metric point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

/// Basic data unit handed to the batch writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Measurement name, e.g. `downstream_channels`
    pub measurement: String,

    /// Indexed attributes
    pub tags: BTreeMap<String, String>,

    /// Non-indexed values
    pub fields: BTreeMap<String, FieldValue>,

    /// Tick time of the poll cycle that produced this point
    pub timestamp: SystemTime,
}

impl MetricPoint {
    pub fn new(measurement: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overwrites_duplicate_keys() {
        let point = MetricPoint::new("m", SystemTime::UNIX_EPOCH)
            .tag("channel", "1")
            .tag("channel", "2")
            .field("snr", 40.9)
            .field("snr", 41.0);

        assert_eq!(point.tags.len(), 1);
        assert_eq!(point.tags["channel"], "2");
        assert_eq!(point.fields["snr"], FieldValue::Float(41.0));
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(FieldValue::from(3usize), FieldValue::Integer(3));
        assert_eq!(FieldValue::from("Locked"), FieldValue::String("Locked".into()));
        assert_eq!(FieldValue::from(true), FieldValue::Boolean(true));
    }
}
