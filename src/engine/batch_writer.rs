//! Background writer that batches points and flushes them on a timer.
//!
//! Producers push into a bounded queue through [`PointSender`]; a single
//! task owns the accumulator, so it is never touched from two places at
//! once. Each flush makes exactly one backend call. Whatever the outcome,
//! the accumulator starts empty again: failed batches are dropped, not
//! retried.

use crate::core::MetricPoint;
use crate::observability::WriterMetrics;
use crate::sink::{PointSink, WriteError};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Points the ingestion queue holds before producers block
    pub queue_capacity: usize,
    pub flush_interval: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// The writer task has stopped and no longer accepts points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("batch writer is no longer running")]
pub struct WriterClosed;

/// Producer handle. Cheap to clone; sends wait while the queue is full.
#[derive(Clone)]
pub struct PointSender {
    tx: mpsc::Sender<MetricPoint>,
}

impl PointSender {
    pub async fn send(&self, point: MetricPoint) -> Result<(), WriterClosed> {
        self.tx.send(point).await.map_err(|_| WriterClosed)
    }

    /// Send in iteration order, returning how many were queued
    pub async fn send_all<I>(&self, points: I) -> Result<usize, WriterClosed>
    where
        I: IntoIterator<Item = MetricPoint>,
    {
        let mut sent = 0;
        for point in points {
            self.send(point).await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Free slots left in the queue right now
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// What a flush attempt did
#[derive(Debug)]
pub enum FlushOutcome {
    /// Nothing pending, backend not called
    Empty,
    Written(usize),
    Discarded { points: usize, error: WriteError },
}

/// The accumulator of not-yet-flushed points
#[derive(Debug, Default)]
pub struct PointBatch {
    points: Vec<MetricPoint>,
}

impl PointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: MetricPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    /// Hand the whole batch to `sink` in one call. The batch is empty
    /// afterwards regardless of the result.
    pub async fn flush<S: PointSink + ?Sized>(&mut self, sink: &S) -> FlushOutcome {
        if self.points.is_empty() {
            return FlushOutcome::Empty;
        }

        let points = std::mem::take(&mut self.points);
        match sink.write_batch(&points).await {
            Ok(()) => FlushOutcome::Written(points.len()),
            Err(error) => FlushOutcome::Discarded {
                points: points.len(),
                error,
            },
        }
    }
}

pub struct BatchWriter<S> {
    sink: S,
    rx: mpsc::Receiver<MetricPoint>,
    batch: PointBatch,
    flush_interval: Duration,
    metrics: Arc<WriterMetrics>,
}

impl<S: PointSink + 'static> BatchWriter<S> {
    /// Create the queue and the (not yet running) writer
    pub fn new(sink: S, config: &WriterConfig) -> (PointSender, Self) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let writer = Self {
            sink,
            rx,
            batch: PointBatch::new(),
            flush_interval: config.flush_interval,
            metrics: Arc::new(WriterMetrics::new()),
        };
        (PointSender { tx }, writer)
    }

    pub fn with_metrics(mut self, metrics: Arc<WriterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<WriterMetrics> {
        self.metrics.clone()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until every sender is dropped, then flush what is left and return
    pub async fn run(self) {
        let BatchWriter {
            sink,
            mut rx,
            mut batch,
            flush_interval,
            metrics,
        } = self;

        let mut ticker = time::interval_at(Instant::now() + flush_interval, flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(point) => {
                        metrics.record_ingested();
                        batch.push(point);
                    }
                    None => {
                        flush_batch(&mut batch, &sink, &metrics).await;
                        info!("all point senders dropped, writer stopping");
                        return;
                    }
                },
                _ = ticker.tick() => {
                    flush_batch(&mut batch, &sink, &metrics).await;
                }
            }
        }
    }
}

async fn flush_batch<S: PointSink + ?Sized>(
    batch: &mut PointBatch,
    sink: &S,
    metrics: &WriterMetrics,
) {
    if batch.is_empty() {
        return;
    }
    info!("writing {} points to backend", batch.len());

    match batch.flush(sink).await {
        FlushOutcome::Empty => {}
        FlushOutcome::Written(count) => metrics.record_batch_written(count),
        FlushOutcome::Discarded { points, error } => {
            error!("writing to backend failed, dropping {} points: {}", points, error);
            metrics.record_batch_failed(points);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use std::time::SystemTime;

    fn point(n: usize) -> MetricPoint {
        MetricPoint::new("test", SystemTime::UNIX_EPOCH).field("n", n)
    }

    #[tokio::test]
    async fn test_flush_empty_batch_skips_backend() {
        let sink = RecordingSink::new();
        let mut batch = PointBatch::new();

        assert!(matches!(batch.flush(&sink).await, FlushOutcome::Empty));
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_flush_leaves_batch_empty() {
        let sink = RecordingSink::new();
        sink.fail_next(1);

        let mut batch = PointBatch::new();
        batch.push(point(1));
        batch.push(point(2));

        match batch.flush(&sink).await {
            FlushOutcome::Discarded { points, .. } => assert_eq!(points, 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(batch.len(), 0);
        assert_eq!(sink.calls(), 1);
    }

    #[tokio::test]
    async fn test_successful_flush_sends_everything_once() {
        let sink = RecordingSink::new();
        let mut batch = PointBatch::new();
        for n in 0..5 {
            batch.push(point(n));
        }

        assert!(matches!(batch.flush(&sink).await, FlushOutcome::Written(5)));
        assert!(batch.is_empty());
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(sink.batches()[0].len(), 5);
    }

    #[tokio::test]
    async fn test_failed_flush_never_resends_under_any_interleaving() {
        // Alternate pushes and flushes with every failure pattern over 4 flushes
        for mask in 0u32..16 {
            let sink = RecordingSink::new();
            let mut batch = PointBatch::new();
            let mut expected_written = 0;

            for round in 0..4 {
                for n in 0..=round {
                    batch.push(point(n));
                }
                let fail = mask & (1 << round) != 0;
                if fail {
                    sink.fail_next(1);
                } else {
                    expected_written += round + 1;
                }
                batch.flush(&sink).await;
                assert_eq!(batch.len(), 0);
            }

            assert_eq!(sink.calls(), 4);
            assert_eq!(sink.points().len(), expected_written);
        }
    }
}
