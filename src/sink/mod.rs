pub mod influx;
pub mod line_protocol;
pub mod mock;

pub use influx::InfluxHttpSink;
pub use mock::RecordingSink;

use crate::core::MetricPoint;
use async_trait::async_trait;
use thiserror::Error;

/// Backend write failure. The batch that produced it is discarded.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("point could not be encoded: {0}")]
    Encode(String),
}

/// Destination for batches of points
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Write the whole batch; the outcome applies to every point in it
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), WriteError>;
}

#[async_trait]
impl<S: PointSink + ?Sized> PointSink for std::sync::Arc<S> {
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), WriteError> {
        (**self).write_batch(points).await
    }
}
