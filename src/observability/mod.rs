pub mod metrics;
pub mod monitor;

pub use metrics::{PollMetrics, WriterMetrics};
pub use monitor::{StatusMonitor, StatusSnapshot};
