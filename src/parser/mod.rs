//! Decoder for the modem's `|+|` / `^` delimited channel-info strings.
//!
//! Decoding is all-or-nothing: one malformed segment or one bad numeric
//! field rejects the whole string and no records are returned.

pub mod error;

pub use error::{NumericError, ParseError};

use crate::core::{DownstreamChannelRecord, UpstreamChannelRecord};

/// Separates one channel from the next
pub const SEGMENT_SEPARATOR: &str = "|+|";

/// Separates fields within a channel
pub const FIELD_SEPARATOR: char = '^';

/// A record type with a fixed positional layout
pub trait ChannelRecord: Sized {
    /// Number of `^`-separated fields a segment must split into,
    /// including the empty slot after the terminating separator
    const FIELD_COUNT: usize;

    /// Build a record from exactly `FIELD_COUNT` fields
    fn from_fields(fields: &SegmentFields<'_>) -> Result<Self, ParseError>;
}

/// Positional view over one split segment
pub struct SegmentFields<'a> {
    segment: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> SegmentFields<'a> {
    pub fn segment(&self) -> &'a str {
        self.segment
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw text at `index`
    pub fn text(&self, index: usize, name: &'static str) -> Result<&'a str, ParseError> {
        self.fields
            .get(index)
            .copied()
            .ok_or_else(|| ParseError::MissingField {
                index,
                name,
                segment: self.segment.to_string(),
            })
    }

    pub fn int(&self, index: usize, name: &'static str) -> Result<i64, ParseError> {
        self.text(index, name)?
            .parse::<i64>()
            .map_err(|e| self.field_error(index, name, e.into()))
    }

    pub fn float(&self, index: usize, name: &'static str) -> Result<f64, ParseError> {
        let text = self.text(index, name)?;
        self.finite(text, index, name)
    }

    /// Float field that may carry padding spaces, e.g. `" 4.4"`
    pub fn padded_float(&self, index: usize, name: &'static str) -> Result<f64, ParseError> {
        let text = self.text(index, name)?.trim_matches(' ');
        self.finite(text, index, name)
    }

    /// `f64::from_str` accepts `NaN` and `inf`; readings must be finite
    fn finite(&self, text: &str, index: usize, name: &'static str) -> Result<f64, ParseError> {
        let value = text
            .parse::<f64>()
            .map_err(|e| self.field_error(index, name, e.into()))?;
        if !value.is_finite() {
            return Err(self.field_error(index, name, NumericError::NonFinite(text.to_string())));
        }
        Ok(value)
    }

    fn field_error(&self, index: usize, name: &'static str, source: NumericError) -> ParseError {
        ParseError::Field {
            index,
            name,
            segment: self.segment.to_string(),
            source,
        }
    }
}

/// Split `raw` into segments and each segment into fields, checking that
/// every non-empty segment has exactly `expected_field_count` fields.
pub fn split_segments(
    raw: &str,
    expected_field_count: usize,
) -> Result<Vec<SegmentFields<'_>>, ParseError> {
    let segments: Vec<&str> = raw
        .split(SEGMENT_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();

    let mut split = Vec::with_capacity(segments.len());
    for segment in segments {
        let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
        if fields.len() != expected_field_count {
            return Err(ParseError::MalformedRecord {
                expected: expected_field_count,
                found: fields.len(),
                segment: segment.to_string(),
            });
        }
        split.push(SegmentFields { segment, fields });
    }

    Ok(split)
}

/// Parse every channel in `raw`, preserving source order
pub fn parse<R: ChannelRecord>(raw: &str) -> Result<Vec<R>, ParseError> {
    let segments = split_segments(raw, R::FIELD_COUNT)?;
    let mut records = Vec::with_capacity(segments.len());
    for fields in &segments {
        records.push(R::from_fields(fields)?);
    }
    Ok(records)
}

pub fn parse_downstream(raw: &str) -> Result<Vec<DownstreamChannelRecord>, ParseError> {
    parse(raw)
}

pub fn parse_upstream(raw: &str) -> Result<Vec<UpstreamChannelRecord>, ParseError> {
    parse(raw)
}

impl ChannelRecord for DownstreamChannelRecord {
    const FIELD_COUNT: usize = 10;

    fn from_fields(f: &SegmentFields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            channel: f.int(0, "channel")?,
            status: f.text(1, "status")?.to_string(),
            modulation: f.text(2, "modulation")?.to_string(),
            cmts_channel: f.int(3, "cmts_channel")?,
            signal_center: f.padded_float(4, "signal_center")?,
            signal_strength: f.padded_float(5, "signal_strength")?,
            snr: f.float(6, "snr")?,
            corrected_errors: f.int(7, "corrected_errors")?,
            uncorrected_errors: f.int(8, "uncorrected_errors")?,
        })
    }
}

impl ChannelRecord for UpstreamChannelRecord {
    const FIELD_COUNT: usize = 8;

    fn from_fields(f: &SegmentFields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            channel: f.int(0, "channel")?,
            status: f.text(1, "status")?.to_string(),
            modulation: f.text(2, "modulation")?.to_string(),
            cmts_channel: f.int(3, "cmts_channel")?,
            symbol_rate: f.int(4, "symbol_rate")?,
            signal_center: f.padded_float(5, "signal_center")?,
            launch_power: f.float(6, "launch_power")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_counts_trailing_slot() {
        let segments = split_segments("1^Locked^SC-QAM^1^5120^35.8^35.0^", 8).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 8);
        assert_eq!(segments[0].text(7, "reserved").unwrap(), "");
    }

    #[test]
    fn test_split_skips_empty_segments() {
        let raw = "|+|1^a^|+||+|2^b^|+|";
        let segments = split_segments(raw, 3).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].segment(), "1^a^");
        assert_eq!(segments[1].segment(), "2^b^");
    }

    #[test]
    fn test_padded_float_only_strips_spaces() {
        let segments = split_segments(" 4.4^\t4.4^", 3).unwrap();
        assert_eq!(segments[0].padded_float(0, "a").unwrap(), 4.4);
        assert!(segments[0].padded_float(1, "b").is_err());
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let segments = split_segments("1^2^", 3).unwrap();
        let fields = &segments[0];

        assert!(matches!(
            fields.text(5, "late"),
            Err(ParseError::MissingField { index: 5, .. })
        ));
        assert!(fields.int(3, "channel").is_err());
        assert!(fields.float(9, "snr").is_err());
        assert!(fields.padded_float(4, "signal_center").is_err());
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for reading in ["NaN", "inf", "-infinity", " inf "] {
            let raw = format!("1^{}^", reading);
            let segments = split_segments(&raw, 3).unwrap();
            let err = segments[0].padded_float(1, "snr").unwrap_err();
            assert!(matches!(
                err,
                ParseError::Field {
                    source: NumericError::NonFinite(_),
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_field_error_names_index() {
        let err = parse_upstream("1^Locked^SC-QAM^1^fast^35.8^35.0^").unwrap_err();
        match err {
            ParseError::Field { index, name, .. } => {
                assert_eq!(index, 4);
                assert_eq!(name, "symbol_rate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
