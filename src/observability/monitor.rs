use super::{PollMetrics, WriterMetrics};
use std::sync::Arc;

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub cycles: u64,
    pub poll_errors: u64,
    pub protocol_switches: u64,
    pub points_emitted: u64,
    pub points_ingested: u64,
    pub batches_written: u64,
    pub batches_failed: u64,
    pub points_discarded: u64,
}

/// Read-only view over the poll and writer counters
#[derive(Clone)]
pub struct StatusMonitor {
    poll: Arc<PollMetrics>,
    writer: Arc<WriterMetrics>,
}

impl StatusMonitor {
    pub fn new(poll: Arc<PollMetrics>, writer: Arc<WriterMetrics>) -> Self {
        Self { poll, writer }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            cycles: self.poll.cycles(),
            poll_errors: self.poll.transport_errors()
                + self.poll.decode_errors()
                + self.poll.parse_errors(),
            protocol_switches: self.poll.protocol_switches(),
            points_emitted: self.poll.points_emitted(),
            points_ingested: self.writer.points_ingested(),
            batches_written: self.writer.batches_written(),
            batches_failed: self.writer.batches_failed(),
            points_discarded: self.writer.points_discarded(),
        }
    }

    /// One-line summary for the log
    pub fn generate_report(&self) -> String {
        let s = self.snapshot();
        format!(
            "cycles={} poll_errors={} protocol_switches={} last_fetch={:?} points_emitted={} \
             points_ingested={} batches_written={} batches_failed={} points_discarded={}",
            s.cycles,
            s.poll_errors,
            s.protocol_switches,
            self.poll.last_fetch_latency(),
            s.points_emitted,
            s.points_ingested,
            s.batches_written,
            s.batches_failed,
            s.points_discarded,
        )
    }

    pub fn poll_metrics(&self) -> &PollMetrics {
        &self.poll
    }

    pub fn writer_metrics(&self) -> &WriterMetrics {
        &self.writer
    }
}
