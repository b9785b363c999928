use super::{PointSink, WriteError};
use crate::core::MetricPoint;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory sink that records every write attempt.
///
/// Writes fail while `failures_remaining` is non-zero; each failing call
/// decrements it.
#[derive(Default)]
pub struct RecordingSink {
    calls: AtomicUsize,
    failures_remaining: AtomicUsize,
    written: Mutex<Vec<Vec<MetricPoint>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` writes fail
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of `write_batch` calls, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Batches that were accepted, in write order
    pub fn batches(&self) -> Vec<Vec<MetricPoint>> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// All accepted points, flattened
    pub fn points(&self) -> Vec<MetricPoint> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl PointSink for RecordingSink {
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), WriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(WriteError::Transport("simulated failure".to_string()));
        }

        let mut written = self
            .written
            .lock()
            .map_err(|_| WriteError::Transport("recording lock poisoned".to_string()))?;
        written.push(points.to_vec());
        Ok(())
    }
}
