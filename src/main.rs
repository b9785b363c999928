use anyhow::{Context, Result};
use cablestat::cli::Cli;
use cablestat::device::{HnapClient, Poller};
use cablestat::engine::{BatchWriter, PollScheduler};
use cablestat::observability::{PollMetrics, StatusMonitor, WriterMetrics};
use cablestat::points::PointBuilder;
use cablestat::sink::InfluxHttpSink;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &cli.log_level {
        logger.parse_filters(filter);
    }
    logger.init();

    let config = cli.into_config().context("loading configuration")?;
    info!(
        "polling {} every {:?}, writing to {} database {}",
        config.modem_host,
        config.poll_interval(),
        config.influxdb_address,
        config.influxdb_database
    );

    let sink = InfluxHttpSink::new(
        &config.influxdb_address,
        &config.influxdb_database,
        config.write_timeout(),
    )
    .context("creating influxdb client")?;
    sink.ping()
        .await
        .with_context(|| format!("influxdb at {} is not reachable", config.influxdb_address))?;

    let writer_metrics = Arc::new(WriterMetrics::new());
    let poll_metrics = Arc::new(PollMetrics::new());
    let monitor = StatusMonitor::new(poll_metrics.clone(), writer_metrics.clone());

    let (sender, writer) = BatchWriter::new(sink, &config.writer_config());
    let writer_handle = writer.with_metrics(writer_metrics).spawn();

    let client = HnapClient::new(config.modem_host.clone(), config.request_timeout())
        .context("creating modem http client")?;

    let scheduler = PollScheduler::new(
        Poller::new(client),
        PointBuilder::new(config.device.clone()),
        sender,
        config.protocol,
    )
    .with_metrics(poll_metrics)
    .with_monitor(monitor, config.report_every_cycles);

    let closed = scheduler.run(config.poll_interval()).await;
    error!("poll loop stopped: {}", closed);
    writer_handle.await.context("batch writer task failed")?;
    Err(closed.into())
}
