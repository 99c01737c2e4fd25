//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first one found.

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("logging.level `{0}` is not a valid filter directive")]
    LogLevel(String),

    #[error("logging.forward.address `{0}` must be host:port")]
    ForwardAddress(String),

    #[error("logging.forward.queue_capacity must be greater than zero")]
    QueueCapacity,

    #[error("logging.forward.reconnect_base_delay_ms exceeds reconnect_max_delay_ms")]
    ReconnectDelays,

    #[error("metrics.path `{0}` must start with '/' and must not be '/'")]
    MetricsPath(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    let forward = &config.logging.forward;
    if forward.enabled {
        if !is_host_port(&forward.address) {
            errors.push(ValidationError::ForwardAddress(forward.address.clone()));
        }
        if forward.queue_capacity == 0 {
            errors.push(ValidationError::QueueCapacity);
        }
        if forward.connect_timeout_secs == 0 {
            errors.push(ValidationError::ZeroTimeout("connect_timeout_secs"));
        }
        if forward.reconnect_base_delay_ms > forward.reconnect_max_delay_ms {
            errors.push(ValidationError::ReconnectDelays);
        }
    }

    if config.metrics.enabled {
        let path = &config.metrics.path;
        if !path.starts_with('/') || path == "/" {
            errors.push(ValidationError::MetricsPath(path.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
