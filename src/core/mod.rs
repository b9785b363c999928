pub mod channel;
pub mod point;

pub use channel::{ChannelReport, DownstreamChannelRecord, UpstreamChannelRecord};
pub use point::{FieldValue, MetricPoint};
