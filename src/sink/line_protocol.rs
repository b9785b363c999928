//! InfluxDB line protocol encoding.
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Timestamps are written with second precision to match the `precision=s`
//! query parameter used by the HTTP sink.

use crate::core::{FieldValue, MetricPoint};
use crate::sink::WriteError;
use log::warn;
use std::time::UNIX_EPOCH;

impl FieldValue {
    /// Render this value for a line protocol field set
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

/// Encode one point as a single line (no trailing newline)
pub fn encode_point(point: &MetricPoint) -> Result<String, WriteError> {
    if point.fields.is_empty() {
        return Err(WriteError::Encode(format!(
            "point {} has no fields",
            point.measurement
        )));
    }
    if let Some((key, value)) = point
        .fields
        .iter()
        .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
    {
        return Err(WriteError::Encode(format!(
            "field {} of {} is not finite: {:?}",
            key, point.measurement, value
        )));
    }

    let seconds = point
        .timestamp
        .duration_since(UNIX_EPOCH)
        .map_err(|e| WriteError::Encode(format!("timestamp before epoch: {}", e)))?
        .as_secs();

    let mut line = escape_measurement(&point.measurement);

    // BTreeMap iteration keeps tags in canonical (sorted) order
    for (key, value) in &point.tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&value.to_line_protocol());
    }

    line.push(' ');
    line.push_str(&seconds.to_string());
    Ok(line)
}

/// Encode a batch as a newline-separated request body. Points that cannot
/// be encoded are logged and left out; the batch fails only if none remain.
pub fn encode_batch(points: &[MetricPoint]) -> Result<String, WriteError> {
    let mut body = String::with_capacity(points.len() * 128);
    let mut skipped = 0;
    for point in points {
        match encode_point(point) {
            Ok(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            Err(e) => {
                warn!("skipping point: {}", e);
                skipped += 1;
            }
        }
    }
    if body.is_empty() && skipped > 0 {
        return Err(WriteError::Encode(format!(
            "none of {} points could be encoded",
            skipped
        )));
    }
    Ok(body)
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys share the same escaping rules
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_field_value_rendering() {
        assert_eq!(FieldValue::Float(4.4).to_line_protocol(), "4.4");
        assert_eq!(FieldValue::Integer(2135).to_line_protocol(), "2135i");
        assert_eq!(FieldValue::Boolean(false).to_line_protocol(), "false");
        assert_eq!(
            FieldValue::String("say \"hi\"".into()).to_line_protocol(),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_encode_sorted_tags_and_fields() {
        let point = MetricPoint::new("downstream_channels", at(1_700_000_000))
            .tag("signal_center", "477.000000")
            .tag("channel", "1")
            .field("snr", 40.9)
            .field("corrected_errors", 2135i64);

        assert_eq!(
            encode_point(&point).unwrap(),
            "downstream_channels,channel=1,signal_center=477.000000 corrected_errors=2135i,snr=40.9 1700000000"
        );
    }

    #[test]
    fn test_encode_escapes_special_chars() {
        let point = MetricPoint::new("my measurement", at(3))
            .tag("tag key", "tag,value")
            .field("field=key", "hello");

        assert_eq!(
            encode_point(&point).unwrap(),
            "my\\ measurement,tag\\ key=tag\\,value field\\=key=\"hello\" 3"
        );
    }

    #[test]
    fn test_encode_rejects_point_without_fields() {
        let point = MetricPoint::new("empty", at(1));
        assert!(matches!(encode_point(&point), Err(WriteError::Encode(_))));
    }

    #[test]
    fn test_encode_rejects_nan() {
        let point = MetricPoint::new("m", at(1)).field("snr", f64::NAN);
        assert!(matches!(encode_point(&point), Err(WriteError::Encode(_))));
    }

    #[test]
    fn test_encode_batch_skips_only_unencodable_points() {
        let points = vec![
            MetricPoint::new("a", at(1)).field("number", 1usize),
            MetricPoint::new("bad", at(1)).field("snr", f64::NAN),
            MetricPoint::new("b", at(1)).field("number", 2usize),
        ];
        assert_eq!(encode_batch(&points).unwrap(), "a number=1i 1\nb number=2i 1\n");
    }

    #[test]
    fn test_encode_batch_fails_when_nothing_encodes() {
        let points = vec![MetricPoint::new("bad", at(1)).field("snr", f64::INFINITY)];
        assert!(matches!(encode_batch(&points), Err(WriteError::Encode(_))));
    }

    #[test]
    fn test_encode_batch_one_line_per_point() {
        let points = vec![
            MetricPoint::new("a", at(1)).field("number", 1usize),
            MetricPoint::new("b", at(1)).field("number", 2usize),
        ];
        assert_eq!(encode_batch(&points).unwrap(), "a number=1i 1\nb number=2i 1\n");
    }
}
