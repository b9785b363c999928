use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Why a numeric field failed to parse
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),
    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),
    #[error("non-finite value: {0}")]
    NonFinite(String),
}

/// Channel-info decoding failure. Any one of these rejects the whole string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("channel segment has {found} fields, expected {expected}: {segment:?}")]
    MalformedRecord {
        expected: usize,
        found: usize,
        segment: String,
    },

    #[error("field {index} ({name}) of segment {segment:?}: {source}")]
    Field {
        index: usize,
        name: &'static str,
        segment: String,
        #[source]
        source: NumericError,
    },

    #[error("field {index} ({name}) missing from segment {segment:?}")]
    MissingField {
        index: usize,
        name: &'static str,
        segment: String,
    },
}

impl ParseError {
    /// Segment text that caused the failure
    pub fn segment(&self) -> &str {
        match self {
            ParseError::MalformedRecord { segment, .. } => segment,
            ParseError::Field { segment, .. } => segment,
            ParseError::MissingField { segment, .. } => segment,
        }
    }
}
