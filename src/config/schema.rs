//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the greeting service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Log level, format and forwarding.
    pub logging: LoggingConfig,

    /// Request metrics instrumentation.
    pub metrics: MetricsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl ServiceConfig {
    /// Apply a variant preset on top of this configuration.
    pub fn apply_profile(&mut self, profile: Profile) {
        match profile {
            Profile::Plain => {
                self.logging.format = LogFormat::Plain;
                self.logging.forward.enabled = false;
                self.metrics.enabled = false;
            }
            Profile::Backend => {
                self.logging.format = LogFormat::Json;
                self.logging.forward.enabled = true;
                self.metrics.enabled = true;
            }
        }
    }
}

/// Named presets for the two shipped variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Plain-text logs on stderr, no metrics.
    Plain,
    /// JSON logs forwarded to the collector, `/metrics` exposed.
    Backend,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Log record layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `asctime - levelname - message`
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression). `RUST_LOG` takes precedence.
    pub level: String,

    /// Record layout.
    pub format: LogFormat,

    /// Remote collector settings.
    pub forward: ForwardConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            forward: ForwardConfig::default(),
        }
    }
}

/// Log forwarding over TCP.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForwardConfig {
    /// Ship records to the collector instead of stderr.
    pub enabled: bool,

    /// Collector address (`host:port`).
    pub address: String,

    /// Initial connection timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Records buffered between the logger and the socket writer.
    pub queue_capacity: usize,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Maximum delay for reconnect backoff in milliseconds.
    pub reconnect_max_delay_ms: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "logstash:5044".to_string(),
            connect_timeout_secs: 5,
            queue_capacity: 1024,
            reconnect_base_delay_ms: 100,
            reconnect_max_delay_ms: 5000,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Instrument requests and expose the scrape endpoint.
    pub enabled: bool,

    /// Scrape endpoint path.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "/metrics".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,

    /// Time allowed for queued log records to flush on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}
