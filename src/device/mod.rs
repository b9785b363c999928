pub mod client;
pub mod envelope;
pub mod mock;
pub mod poller;
pub mod protocol;

pub use client::HnapClient;
pub use envelope::HnapEnvelope;
pub use mock::{ScriptedReply, ScriptedSource};
pub use poller::{FetchOutcome, PollOutcome, Poller};
pub use protocol::Protocol;

use crate::parser::ParseError;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Which channel-info string a parse error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downstream,
    Upstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Downstream => f.write_str("downstream"),
            Direction::Upstream => f.write_str("upstream"),
        }
    }
}

/// The request never produced a body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{protocol} request failed: {message}")]
pub struct TransportError {
    pub protocol: Protocol,
    pub message: String,
}

impl TransportError {
    pub fn new(protocol: Protocol, message: impl Into<String>) -> Self {
        Self {
            protocol,
            message: message.into(),
        }
    }
}

/// Per-cycle failure. Every variant skips the cycle; none is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unable to decode response body: {0}")]
    Decode(String),

    #[error("unable to parse {direction} channel info: {source}")]
    Parse {
        direction: Direction,
        #[source]
        source: ParseError,
    },
}

/// Something that can fetch the raw HNAP status body
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, protocol: Protocol) -> Result<String, TransportError>;
}
