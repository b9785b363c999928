use super::envelope::{HNAP_PATH, REQUEST_BODY, SOAP_ACTION, SOAP_ACTION_HEADER};
use super::{Protocol, StatusSource, TransportError};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use std::time::{Duration, Instant};

/// HTTP(S) client for the modem's HNAP endpoint.
///
/// Holds one client per scheme; both share the same request timeout.
pub struct HnapClient {
    host: String,
    secure: Client,
    plain: Client,
}

impl HnapClient {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let secure = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;
        let plain = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            host: host.into(),
            secure,
            plain,
        })
    }

    pub fn endpoint(&self, protocol: Protocol) -> String {
        format!("{}://{}{}", protocol.scheme(), self.host, HNAP_PATH)
    }

    fn client(&self, protocol: Protocol) -> &Client {
        match protocol {
            Protocol::Https => &self.secure,
            Protocol::Http => &self.plain,
        }
    }
}

#[async_trait]
impl StatusSource for HnapClient {
    async fn fetch(&self, protocol: Protocol) -> Result<String, TransportError> {
        let start = Instant::now();
        let response = self
            .client(protocol)
            .post(self.endpoint(protocol))
            .header(SOAP_ACTION_HEADER, SOAP_ACTION)
            .body(REQUEST_BODY)
            .send()
            .await
            .map_err(|e| TransportError::new(protocol, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(protocol, format!("unable to read body: {}", e)))?;

        info!("got response status={} took={:?}", status, start.elapsed());
        Ok(body)
    }
}
