use crate::config::{Config, ConfigError};
use crate::device::Protocol;
use clap::Parser;
use std::path::PathBuf;

/// Poll a cable modem's channel diagnostics and write them to InfluxDB
#[derive(Debug, Parser)]
#[command(name = "cablestat", version)]
pub struct Cli {
    /// JSON config file; flags and environment variables override it
    #[arg(long, env = "CABLESTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// InfluxDB base URL
    #[arg(long, env = "INFLUXDB_ADDRESS")]
    pub influxdb_address: Option<String>,

    /// InfluxDB database name
    #[arg(long, env = "INFLUXDB_DATABASE")]
    pub influxdb_database: Option<String>,

    /// Protocol for the first modem request
    #[arg(long, env = "CABLESTAT_PROTOCOL", value_enum)]
    pub protocol: Option<Protocol>,

    /// Value of the `device` tag added to every point
    #[arg(long, env = "CABLESTAT_DEVICE")]
    pub device: Option<String>,

    /// Modem address
    #[arg(long, env = "CABLESTAT_MODEM_HOST")]
    pub modem_host: Option<String>,

    /// Seconds between polls
    #[arg(long, env = "CABLESTAT_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Milliseconds between backend flushes
    #[arg(long, env = "CABLESTAT_FLUSH_INTERVAL_MS")]
    pub flush_interval_ms: Option<u64>,

    /// Points the writer queue holds before polling blocks
    #[arg(long, env = "CABLESTAT_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Milliseconds before a modem request is abandoned
    #[arg(long, env = "CABLESTAT_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Milliseconds before a backend write is abandoned
    #[arg(long, env = "CABLESTAT_WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: Option<u64>,

    /// Poll cycles between status reports; 0 turns them off
    #[arg(long, env = "CABLESTAT_REPORT_EVERY_CYCLES")]
    pub report_every_cycles: Option<u64>,

    /// Log filter, e.g. `info` or `cablestat=debug`; RUST_LOG is used when unset
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge file, environment and flags into a validated config
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(v) = self.influxdb_address {
            config.influxdb_address = v;
        }
        if let Some(v) = self.influxdb_database {
            config.influxdb_database = v;
        }
        if let Some(v) = self.protocol {
            config.protocol = v;
        }
        if let Some(v) = self.device {
            config.device = Some(v).filter(|d| !d.is_empty());
        }
        if let Some(v) = self.modem_host {
            config.modem_host = v;
        }
        if let Some(v) = self.poll_interval_secs {
            config.poll_interval_secs = v;
        }
        if let Some(v) = self.flush_interval_ms {
            config.flush_interval_ms = v;
        }
        if let Some(v) = self.queue_capacity {
            config.queue_capacity = v;
        }
        if let Some(v) = self.request_timeout_ms {
            config.request_timeout_ms = v;
        }
        if let Some(v) = self.write_timeout_ms {
            config.write_timeout_ms = v;
        }
        if let Some(v) = self.report_every_cycles {
            config.report_every_cycles = v;
        }

        config.validate()?;
        Ok(config)
    }
}
