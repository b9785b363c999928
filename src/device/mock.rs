use super::{Protocol, StatusSource, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Body(String),
    TransportFailure(String),
}

/// Status source that replays canned replies and remembers which protocol
/// each request used. Once the script runs out every fetch fails.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Protocol>>,
}

impl ScriptedSource {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Protocols requested so far, in order
    pub fn requests(&self) -> Vec<Protocol> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Build an HNAP response body carrying the given channel strings
pub fn envelope_body(downstream: &str, upstream: &str) -> String {
    serde_json::json!({
        "GetMultipleHNAPsResponse": {
            "GetMotoStatusDownstreamChannelInfoResponse": {
                "MotoConnDownstreamChannel": downstream,
                "GetMotoStatusDownstreamChannelInfoResult": "OK"
            },
            "GetMotoStatusUpstreamChannelInfoResponse": {
                "MotoConnUpstreamChannel": upstream,
                "GetMotoStatusUpstreamChannelInfoResult": "OK"
            },
            "GetMultipleHNAPsResult": "OK"
        }
    })
    .to_string()
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, protocol: Protocol) -> Result<String, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(protocol);
        }

        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            Some(ScriptedReply::Body(body)) => Ok(body),
            Some(ScriptedReply::TransportFailure(message)) => {
                Err(TransportError::new(protocol, message))
            }
            None => Err(TransportError::new(protocol, "script exhausted")),
        }
    }
}
