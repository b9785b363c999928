//! Runtime configuration.
//!
//! Values come from an optional JSON file and are then overridden by
//! environment variables and command-line flags (see [`crate::cli`]).

use crate::device::Protocol;
use crate::engine::batch_writer::{WriterConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use crate::engine::scheduler::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEM_HOST: &str = "192.168.100.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the InfluxDB HTTP API, e.g. `http://localhost:8086`
    pub influxdb_address: String,
    pub influxdb_database: String,
    /// Protocol for the first poll; later polls follow the fallback rule
    pub protocol: Protocol,
    /// Optional `device` tag added to every point
    pub device: Option<String>,
    pub modem_host: String,
    pub poll_interval_secs: u64,
    pub flush_interval_ms: u64,
    pub queue_capacity: usize,
    pub request_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Log a status report every N poll cycles, 0 disables it
    pub report_every_cycles: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            influxdb_address: String::new(),
            influxdb_database: String::new(),
            protocol: Protocol::Https,
            device: None,
            modem_host: DEFAULT_MODEM_HOST.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            request_timeout_ms: 2_000,
            write_timeout_ms: 5_000,
            report_every_cycles: 10,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.influxdb_address.trim().is_empty() {
            return Err(ConfigError::Invalid("influxdb address is required".into()));
        }
        if self.influxdb_database.trim().is_empty() {
            return Err(ConfigError::Invalid("influxdb database is required".into()));
        }
        if self.modem_host.trim().is_empty() {
            return Err(ConfigError::Invalid("modem host must not be empty".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll interval must be positive".into()));
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid("flush interval must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue capacity must be positive".into()));
        }
        if self.request_timeout_ms == 0 || self.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            queue_capacity: self.queue_capacity,
            flush_interval: Duration::from_millis(self.flush_interval_ms),
        }
    }
}
