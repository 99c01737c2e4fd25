//! Log forwarding to a remote collector over TCP.
//!
//! # Data Flow
//! ```text
//! tracing event
//!     → fmt layer (JsonFormat) writes one line into a ForwardLine
//!     → ForwardLine dropped: line queued on a bounded channel
//!     → ForwarderTask writes it to the socket
//!     → on write failure: reconnect with backoff, resend the line
//! ```
//!
//! The connection is opened once at startup and a failure there is fatal.
//! Logging never blocks on the network: when the queue is full the record
//! is dropped and counted in `log_forward_dropped_total`. Once shutdown
//! fires there are no more reconnects; records that cannot be written are
//! dropped and counted the same way.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::fmt::MakeWriter;

use crate::config::ForwardConfig;
use crate::resilience::Backoff;

/// Metric counting records dropped because the queue was full.
pub const DROPPED_TOTAL: &str = "log_forward_dropped_total";
/// Metric counting successful reconnects to the collector.
pub const RECONNECTS_TOTAL: &str = "log_forward_reconnects_total";

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to resolve log collector address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to connect to log collector at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out connecting to log collector at {address} after {secs}s")]
    Timeout { address: String, secs: u64 },
}

/// Open the collector connection and build the writer/task pair.
///
/// The writer goes into the logging layer; the task must be spawned to
/// drain the queue.
pub async fn connect(config: &ForwardConfig) -> Result<(ForwardWriter, ForwarderTask), ForwardError> {
    let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
    let stream = open(&config.address, connect_timeout).await?;

    let (tx, rx) = mpsc::channel(config.queue_capacity);

    Ok((
        ForwardWriter { tx },
        ForwarderTask {
            rx,
            stream,
            address: config.address.clone(),
            connect_timeout,
            backoff: Backoff::new(config.reconnect_base_delay_ms, config.reconnect_max_delay_ms),
        },
    ))
}

async fn open(address: &str, connect_timeout: Duration) -> Result<TcpStream, ForwardError> {
    let attempt = async {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(address)
            .await
            .map_err(|source| ForwardError::Resolve {
                address: address.to_string(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ForwardError::Resolve {
                address: address.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
            });
        }

        TcpStream::connect(addrs.as_slice())
            .await
            .map_err(|source| ForwardError::Connect {
                address: address.to_string(),
                source,
            })
    };

    let stream = tokio::time::timeout(connect_timeout, attempt)
        .await
        .map_err(|_| ForwardError::Timeout {
            address: address.to_string(),
            secs: connect_timeout.as_secs(),
        })??;

    if let Err(error) = stream.set_nodelay(true) {
        tracing::debug!(address, %error, "Could not set TCP_NODELAY on collector socket");
    }
    Ok(stream)
}

/// `MakeWriter` feeding the forwarder queue.
#[derive(Debug, Clone)]
pub struct ForwardWriter {
    tx: mpsc::Sender<Vec<u8>>,
}

impl<'a> MakeWriter<'a> for ForwardWriter {
    type Writer = ForwardLine<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        ForwardLine {
            buf: Vec::with_capacity(256),
            tx: &self.tx,
        }
    }
}

/// Buffer for a single record. Queued when dropped.
#[derive(Debug)]
pub struct ForwardLine<'a> {
    buf: Vec<u8>,
    tx: &'a mpsc::Sender<Vec<u8>>,
}

impl io::Write for ForwardLine<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ForwardLine<'_> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let mut line = std::mem::take(&mut self.buf);
        if line.last() != Some(&b'\n') {
            line.push(b'\n');
        }
        if let Err(mpsc::error::TrySendError::Full(_)) = self.tx.try_send(line) {
            metrics::counter!(DROPPED_TOTAL).increment(1);
        }
    }
}

/// Owns the collector socket and writes queued records in order.
#[derive(Debug)]
pub struct ForwarderTask {
    rx: mpsc::Receiver<Vec<u8>>,
    stream: TcpStream,
    address: String,
    connect_timeout: Duration,
    backoff: Backoff,
}

impl ForwarderTask {
    /// Forward records until `shutdown` fires, then flush what is queued.
    ///
    /// A broken connection is retried until shutdown. After that, queued
    /// records get one write attempt each and the rest are dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut connected = true;
        loop {
            tokio::select! {
                line = self.rx.recv() => match line {
                    Some(line) => {
                        if !self.deliver(&line, &mut shutdown).await {
                            connected = false;
                            break;
                        }
                    }
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }

        self.rx.close();
        let mut dropped = 0u64;
        while let Some(line) = self.rx.recv().await {
            if connected && self.stream.write_all(&line).await.is_err() {
                connected = false;
            }
            if !connected {
                dropped += 1;
            }
        }

        if dropped > 0 {
            metrics::counter!(DROPPED_TOTAL).increment(dropped);
        }
        if connected {
            let _ = self.stream.flush().await;
            let _ = self.stream.shutdown().await;
        }
    }

    /// Write one line, reconnecting as needed. Returns `false` when shutdown
    /// fired before the line could be written; the line is then dropped.
    async fn deliver(&mut self, line: &[u8], shutdown: &mut broadcast::Receiver<()>) -> bool {
        loop {
            match self.stream.write_all(line).await {
                Ok(()) => {
                    self.backoff.reset();
                    return true;
                }
                Err(error) => {
                    // Queued behind this line; delivered once reconnected.
                    tracing::warn!(address = %self.address, %error, "Log collector write failed");
                    if !self.reconnect(shutdown).await {
                        metrics::counter!(DROPPED_TOTAL).increment(1);
                        return false;
                    }
                }
            }
        }
    }

    async fn reconnect(&mut self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        loop {
            let delay = self.backoff.next_delay();
            tokio::select! {
                result = reopen(&self.address, self.connect_timeout, delay) => match result {
                    Ok(stream) => {
                        tracing::info!(
                            address = %self.address,
                            attempts = self.backoff.attempts(),
                            "Reconnected to log collector"
                        );
                        metrics::counter!(RECONNECTS_TOTAL).increment(1);
                        self.stream = stream;
                        return true;
                    }
                    Err(error) => {
                        tracing::debug!(%error, attempts = self.backoff.attempts(), "Log collector still unreachable");
                    }
                },
                _ = shutdown.recv() => return false,
            }
        }
    }
}

async fn reopen(address: &str, connect_timeout: Duration, delay: Duration) -> Result<TcpStream, ForwardError> {
    tokio::time::sleep(delay).await;
    open(address, connect_timeout).await
}
