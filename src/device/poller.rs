use super::{HnapEnvelope, PollError, Protocol, StatusSource, TransportError};
use crate::core::ChannelReport;

/// Result of one fetch plus the protocol to use next cycle
#[derive(Debug)]
pub struct FetchOutcome {
    pub body: Result<String, TransportError>,
    pub next_protocol: Protocol,
}

/// Result of one fetch-decode-parse plus the protocol to use next cycle
#[derive(Debug)]
pub struct PollOutcome {
    pub report: Result<ChannelReport, PollError>,
    pub next_protocol: Protocol,
}

/// Wraps a status source with the HTTPS/HTTP fallback rule.
///
/// The protocol is not stored here; callers pass the current one in and
/// carry `next_protocol` forward.
pub struct Poller<S> {
    source: S,
}

impl<S: StatusSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One attempt, no retry. A transport failure flips the protocol.
    pub async fn fetch(&self, protocol: Protocol) -> FetchOutcome {
        let body = self.source.fetch(protocol).await;
        let next_protocol = match body {
            Ok(_) => protocol,
            Err(_) => protocol.toggled(),
        };
        FetchOutcome {
            body,
            next_protocol,
        }
    }

    /// Fetch, decode the envelope and parse both channel strings.
    /// Only transport failures affect the next protocol.
    pub async fn poll(&self, protocol: Protocol) -> PollOutcome {
        let FetchOutcome {
            body,
            next_protocol,
        } = self.fetch(protocol).await;

        let report = body
            .map_err(PollError::from)
            .and_then(|body| HnapEnvelope::decode(&body))
            .and_then(HnapEnvelope::into_report);

        PollOutcome {
            report,
            next_protocol,
        }
    }
}
