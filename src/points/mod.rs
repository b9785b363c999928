//! Maps decoded channel records onto metric points.

use crate::core::{
    ChannelReport, DownstreamChannelRecord, MetricPoint, UpstreamChannelRecord,
};
use std::time::SystemTime;

pub const DOWNSTREAM_MEASUREMENT: &str = "downstream_channels";
pub const UPSTREAM_MEASUREMENT: &str = "upstream_channels";
pub const DOWNSTREAM_BONDED_MEASUREMENT: &str = "downstream_bonded";
pub const UPSTREAM_BONDED_MEASUREMENT: &str = "upstream_bonded";

/// Tag carrying the configured device identifier
pub const DEVICE_TAG: &str = "device";

/// Fixed record-to-point mapping for one record kind
pub trait ToPoint {
    fn to_point(&self, timestamp: SystemTime) -> MetricPoint;
}

/// Frequencies are tagged with six decimals so the tag value is stable
fn frequency_tag(mhz: f64) -> String {
    format!("{:.6}", mhz)
}

impl ToPoint for DownstreamChannelRecord {
    fn to_point(&self, timestamp: SystemTime) -> MetricPoint {
        MetricPoint::new(DOWNSTREAM_MEASUREMENT, timestamp)
            .tag("channel", self.channel.to_string())
            .tag("signal_center", frequency_tag(self.signal_center))
            .field("signal_strength", self.signal_strength)
            .field("snr", self.snr)
            .field("corrected_errors", self.corrected_errors)
            .field("uncorrected_errors", self.uncorrected_errors)
            .field("cmts_channel", self.cmts_channel)
            .field("status", self.status.as_str())
            .field("modulation", self.modulation.as_str())
    }
}

impl ToPoint for UpstreamChannelRecord {
    fn to_point(&self, timestamp: SystemTime) -> MetricPoint {
        MetricPoint::new(UPSTREAM_MEASUREMENT, timestamp)
            .tag("channel", self.channel.to_string())
            .tag("signal_center", frequency_tag(self.signal_center))
            .field("symbol_rate", self.symbol_rate)
            .field("launch_power", self.launch_power)
            .field("cmts_channel", self.cmts_channel)
            .field("status", self.status.as_str())
            .field("modulation", self.modulation.as_str())
    }
}

/// Stateless point factory. Every point it builds for one cycle shares the
/// timestamp passed in by the caller.
#[derive(Debug, Clone, Default)]
pub struct PointBuilder {
    device: Option<String>,
}

impl PointBuilder {
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }

    /// One point per record, in record order
    pub fn build<R: ToPoint>(&self, records: &[R], timestamp: SystemTime) -> Vec<MetricPoint> {
        records
            .iter()
            .map(|record| self.decorate(record.to_point(timestamp)))
            .collect()
    }

    /// Bonded-channel count for one direction
    pub fn bonded_summary(
        &self,
        measurement: &str,
        count: usize,
        timestamp: SystemTime,
    ) -> MetricPoint {
        self.decorate(MetricPoint::new(measurement, timestamp).field("number", count))
    }

    /// All points for one poll cycle: upstream channels, upstream summary,
    /// downstream channels, downstream summary.
    pub fn build_cycle(&self, report: &ChannelReport, timestamp: SystemTime) -> Vec<MetricPoint> {
        let mut points = Vec::with_capacity(report.channel_count() + 2);
        points.extend(self.build(&report.upstream, timestamp));
        points.push(self.bonded_summary(
            UPSTREAM_BONDED_MEASUREMENT,
            report.upstream.len(),
            timestamp,
        ));
        points.extend(self.build(&report.downstream, timestamp));
        points.push(self.bonded_summary(
            DOWNSTREAM_BONDED_MEASUREMENT,
            report.downstream.len(),
            timestamp,
        ));
        points
    }

    fn decorate(&self, point: MetricPoint) -> MetricPoint {
        match &self.device {
            Some(device) => point.tag(DEVICE_TAG, device.as_str()),
            None => point,
        }
    }
}
