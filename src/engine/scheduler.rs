//! Fixed-interval poll loop: fetch, decode, parse, build, enqueue.

use super::batch_writer::{PointSender, WriterClosed};
use crate::device::{PollError, Poller, Protocol, StatusSource};
use crate::observability::{PollMetrics, StatusMonitor};
use crate::points::PointBuilder;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CycleError {
    /// The cycle produced no points; the next tick tries again
    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    WriterClosed(#[from] WriterClosed),
}

pub struct PollScheduler<S> {
    poller: Poller<S>,
    builder: PointBuilder,
    sender: PointSender,
    protocol: Protocol,
    metrics: Arc<PollMetrics>,
    monitor: Option<(StatusMonitor, u64)>,
}

impl<S: StatusSource> PollScheduler<S> {
    pub fn new(
        poller: Poller<S>,
        builder: PointBuilder,
        sender: PointSender,
        protocol: Protocol,
    ) -> Self {
        Self {
            poller,
            builder,
            sender,
            protocol,
            metrics: Arc::new(PollMetrics::new()),
            monitor: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PollMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Log a status report every `every_cycles` cycles
    pub fn with_monitor(mut self, monitor: StatusMonitor, every_cycles: u64) -> Self {
        if every_cycles > 0 {
            self.monitor = Some((monitor, every_cycles));
        }
        self
    }

    /// Protocol the next cycle will use
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn metrics(&self) -> Arc<PollMetrics> {
        self.metrics.clone()
    }

    /// Run one cycle stamped with `timestamp`. Returns the number of points
    /// queued. A poll error queues nothing.
    pub async fn run_cycle(&mut self, timestamp: SystemTime) -> Result<usize, CycleError> {
        self.metrics.record_cycle();

        let start = Instant::now();
        let outcome = self.poller.poll(self.protocol).await;
        self.metrics.record_fetch_latency(start.elapsed());

        if outcome.next_protocol != self.protocol {
            warn!(
                "switching modem protocol from {} to {}",
                self.protocol, outcome.next_protocol
            );
            self.metrics.record_protocol_switch();
            self.protocol = outcome.next_protocol;
        }

        let report = outcome.report.map_err(|e| {
            match &e {
                PollError::Transport(_) => self.metrics.record_transport_error(),
                PollError::Decode(_) => self.metrics.record_decode_error(),
                PollError::Parse { .. } => self.metrics.record_parse_error(),
            }
            e
        })?;

        debug!(
            "decoded {} downstream and {} upstream channels",
            report.downstream.len(),
            report.upstream.len()
        );

        let points = self.builder.build_cycle(&report, timestamp);
        let queued = self.sender.send_all(points).await?;
        self.metrics.record_points(queued);
        Ok(queued)
    }

    /// Poll every `period` until the writer goes away. The first cycle runs
    /// immediately; ticks missed while a cycle overran are skipped.
    pub async fn run(mut self, period: Duration) -> WriterClosed {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let timestamp = SystemTime::now();

            match self.run_cycle(timestamp).await {
                Ok(queued) => debug!("queued {} points", queued),
                Err(CycleError::Poll(e)) => error!("poll cycle skipped: {}", e),
                Err(CycleError::WriterClosed(closed)) => return closed,
            }

            if let Some((monitor, every)) = &self.monitor {
                if self.metrics.cycles() % every == 0 {
                    info!("status: {}", monitor.generate_report());
                }
            }
        }
    }
}
