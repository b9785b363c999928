use serde::{Deserialize, Serialize};

/// One downstream channel as reported by the modem.
///
/// Wire layout, `^`-separated:
/// `channel^status^modulation^cmts_channel^signal_center^signal_strength^snr^corrected^uncorrected^`
/// e.g. `1^Locked^QAM256^3^477.0^ 4.4^40.9^2135^0^`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownstreamChannelRecord {
    pub channel: i64,
    pub status: String,
    pub modulation: String,
    pub cmts_channel: i64,
    /// Center frequency in MHz
    pub signal_center: f64,
    /// Received power in dBmV
    pub signal_strength: f64,
    /// Signal-to-noise ratio in dB
    pub snr: f64,
    pub corrected_errors: i64,
    pub uncorrected_errors: i64,
}

/// One upstream channel as reported by the modem.
///
/// Wire layout: `channel^status^modulation^cmts_channel^symbol_rate^signal_center^launch_power^`
/// e.g. `1^Locked^SC-QAM^1^5120^35.8^35.0^`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamChannelRecord {
    pub channel: i64,
    pub status: String,
    pub modulation: String,
    pub cmts_channel: i64,
    pub symbol_rate: i64,
    /// Center frequency in MHz
    pub signal_center: f64,
    /// Transmit power in dBmV
    pub launch_power: f64,
}

/// Everything decoded from one successful poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub downstream: Vec<DownstreamChannelRecord>,
    pub upstream: Vec<UpstreamChannelRecord>,
}

impl ChannelReport {
    pub fn new(
        downstream: Vec<DownstreamChannelRecord>,
        upstream: Vec<UpstreamChannelRecord>,
    ) -> Self {
        Self {
            downstream,
            upstream,
        }
    }

    /// Total number of channels across both directions
    pub fn channel_count(&self) -> usize {
        self.downstream.len() + self.upstream.len()
    }
}
