//! HNAP `GetMultipleHNAPs` request and response shapes.

use super::{Direction, PollError};
use crate::core::ChannelReport;
use crate::parser;
use serde::Deserialize;

/// Path of the HNAP endpoint on the modem
pub const HNAP_PATH: &str = "/HNAP1/";

/// Header naming the requested HNAP action
pub const SOAP_ACTION_HEADER: &str = "SOAPACTION";
pub const SOAP_ACTION: &str = "\"http://purenetworks.com/HNAP1/GetMultipleHNAPs\"";

/// Requests downstream and upstream channel info in one round trip
pub const REQUEST_BODY: &str = r#"{"GetMultipleHNAPs":{"GetMotoStatusDownstreamChannelInfo":"","GetMotoStatusUpstreamChannelInfo":""}}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct HnapEnvelope {
    #[serde(rename = "GetMultipleHNAPsResponse")]
    pub response: MultipleHnapsResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultipleHnapsResponse {
    #[serde(rename = "GetMotoStatusDownstreamChannelInfoResponse", default)]
    pub downstream: DownstreamInfoResponse,

    #[serde(rename = "GetMotoStatusUpstreamChannelInfoResponse", default)]
    pub upstream: UpstreamInfoResponse,

    #[serde(rename = "GetMultipleHNAPsResult", default)]
    pub result: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownstreamInfoResponse {
    #[serde(rename = "MotoConnDownstreamChannel", default)]
    pub channels: String,

    #[serde(rename = "GetMotoStatusDownstreamChannelInfoResult", default)]
    pub result: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamInfoResponse {
    #[serde(rename = "MotoConnUpstreamChannel", default)]
    pub channels: String,

    #[serde(rename = "GetMotoStatusUpstreamChannelInfoResult", default)]
    pub result: String,
}

impl HnapEnvelope {
    pub fn decode(body: &str) -> Result<Self, PollError> {
        serde_json::from_str(body).map_err(|e| PollError::Decode(e.to_string()))
    }

    /// Parse both channel strings. Downstream is parsed first; either
    /// failing rejects the whole report.
    pub fn into_report(self) -> Result<ChannelReport, PollError> {
        let downstream = parser::parse_downstream(&self.response.downstream.channels)
            .map_err(|source| PollError::Parse {
                direction: Direction::Downstream,
                source,
            })?;
        let upstream = parser::parse_upstream(&self.response.upstream.channels).map_err(
            |source| PollError::Parse {
                direction: Direction::Upstream,
                source,
            },
        )?;
        Ok(ChannelReport::new(downstream, upstream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(REQUEST_BODY).unwrap();
        assert!(value["GetMultipleHNAPs"]["GetMotoStatusDownstreamChannelInfo"].is_string());
    }

    #[test]
    fn test_missing_channel_strings_default_to_empty() {
        let envelope = HnapEnvelope::decode(r#"{"GetMultipleHNAPsResponse":{}}"#).unwrap();
        let report = envelope.into_report().unwrap();
        assert_eq!(report.channel_count(), 0);
    }

    #[test]
    fn test_missing_envelope_is_decode_error() {
        assert!(matches!(
            HnapEnvelope::decode(r#"{"Other":{}}"#),
            Err(PollError::Decode(_))
        ));
        assert!(matches!(
            HnapEnvelope::decode("<html>login</html>"),
            Err(PollError::Decode(_))
        ));
    }
}
