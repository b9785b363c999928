//! InfluxDB 1.x HTTP write API sink.

use super::line_protocol::encode_batch;
use super::{PointSink, WriteError};
use crate::core::MetricPoint;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use std::time::Duration;

/// Writes batches to `{address}/write?db={database}&precision=s`
pub struct InfluxHttpSink {
    client: Client,
    write_url: Url,
    ping_url: Url,
}

impl InfluxHttpSink {
    /// Validate the address and build the HTTP client. Fails fast on a bad
    /// address so misconfiguration surfaces at startup.
    pub fn new(address: &str, database: &str, timeout: Duration) -> Result<Self, WriteError> {
        let base = Url::parse(address)
            .map_err(|e| WriteError::Transport(format!("invalid address {}: {}", address, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(WriteError::Transport(format!(
                "unsupported scheme in {}",
                address
            )));
        }

        let mut write_url = join(&base, "write")?;
        write_url
            .query_pairs_mut()
            .append_pair("db", database)
            .append_pair("precision", "s");
        let ping_url = join(&base, "ping")?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WriteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            write_url,
            ping_url,
        })
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// Check that the backend answers at all
    pub async fn ping(&self) -> Result<(), WriteError> {
        let response = self
            .client
            .get(self.ping_url.clone())
            .send()
            .await
            .map_err(|e| WriteError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WriteError::Rejected {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}

fn join(base: &Url, path: &str) -> Result<Url, WriteError> {
    // A base without a trailing slash would replace its last path segment
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| WriteError::Transport(format!("cannot build {} url: {}", path, e)))
}

#[async_trait]
impl PointSink for InfluxHttpSink {
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), WriteError> {
        let body = encode_batch(points)?;
        debug!("posting {} bytes to {}", body.len(), self.write_url);

        let response = self
            .client
            .post(self.write_url.clone())
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| WriteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(WriteError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
