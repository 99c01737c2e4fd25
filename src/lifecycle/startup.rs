//! Startup orchestration.
//!
//! Order: log forwarder (so the very first records reach the collector) →
//! logging → metrics recorder → listener → HTTP server. Any startup error is
//! fatal. On shutdown the server drains first, then the forwarder flushes
//! within `timeouts.shutdown_grace_secs`.

use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{forward, init_logging, metrics, LogSink};

/// Run the service until a shutdown signal arrives.
pub async fn run(config: ServiceConfig) -> Result<(), ServiceError> {
    let flush = Shutdown::new();
    let mut forwarder = None;

    let sink = if config.logging.forward.enabled {
        let (writer, task) = forward::connect(&config.logging.forward).await?;
        forwarder = Some(tokio::spawn(task.run(flush.subscribe())));
        LogSink::Forward(writer)
    } else {
        LogSink::Stderr
    };
    init_logging(&config.logging, sink)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "greeting-service starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_format = ?config.logging.format,
        forwarding = config.logging.forward.enabled,
        metrics_enabled = config.metrics.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.logging.forward.enabled {
        tracing::info!(address = %config.logging.forward.address, "Forwarding logs to collector");
    }

    let metrics_handle = if config.metrics.enabled {
        let handle = metrics::install()?;
        tracing::info!(path = %config.metrics.path, "Metrics endpoint enabled");
        Some(handle)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let result = HttpServer::new(config, metrics_handle)
        .run(listener, server_shutdown)
        .await;

    tracing::info!("Shutdown complete");

    if let Some(mut handle) = forwarder {
        flush.trigger();
        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            tracing::warn!(grace_secs = grace.as_secs(), "Log forwarder did not flush in time");
            handle.abort();
        }
    }

    result.map_err(ServiceError::from)
}
