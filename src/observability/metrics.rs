use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters updated by the poll loop
#[derive(Debug, Default)]
pub struct PollMetrics {
    cycles: AtomicU64,
    transport_errors: AtomicU64,
    decode_errors: AtomicU64,
    parse_errors: AtomicU64,
    protocol_switches: AtomicU64,
    points_emitted: AtomicU64,
    last_fetch_us: AtomicU64,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn transport_errors(&self) -> u64 {
        self.transport_errors.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    pub fn protocol_switches(&self) -> u64 {
        self.protocol_switches.load(Ordering::Relaxed)
    }

    pub fn points_emitted(&self) -> u64 {
        self.points_emitted.load(Ordering::Relaxed)
    }

    pub fn last_fetch_latency(&self) -> Duration {
        Duration::from_micros(self.last_fetch_us.load(Ordering::Relaxed))
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_protocol_switch(&self) {
        self.protocol_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_points(&self, count: usize) {
        self.points_emitted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_fetch_latency(&self, latency: Duration) {
        self.last_fetch_us
            .store(latency.as_micros() as u64, Ordering::Relaxed);
    }
}

/// Counters updated by the batch writer loop
#[derive(Debug, Default)]
pub struct WriterMetrics {
    points_ingested: AtomicU64,
    batches_written: AtomicU64,
    batches_failed: AtomicU64,
    points_written: AtomicU64,
    points_discarded: AtomicU64,
}

impl WriterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points_ingested(&self) -> u64 {
        self.points_ingested.load(Ordering::Relaxed)
    }

    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    pub fn points_written(&self) -> u64 {
        self.points_written.load(Ordering::Relaxed)
    }

    pub fn points_discarded(&self) -> u64 {
        self.points_discarded.load(Ordering::Relaxed)
    }

    pub fn record_ingested(&self) {
        self.points_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_written(&self, points: usize) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.points_written.fetch_add(points as u64, Ordering::Relaxed);
    }

    pub fn record_batch_failed(&self, points: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.points_discarded.fetch_add(points as u64, Ordering::Relaxed);
    }
}
