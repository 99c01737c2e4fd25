//! Structured logging.
//!
//! Builds the global `tracing` subscriber: an `EnvFilter` (from `RUST_LOG`,
//! falling back to `logging.level`) plus one fmt layer using the configured
//! record layout, writing to stderr or to the log forwarder.

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::observability::format::{JsonFormat, PlainFormat};
use crate::observability::forward::ForwardWriter;

/// Where formatted records go.
#[derive(Debug)]
pub enum LogSink {
    Stderr,
    Forward(ForwardWriter),
}

impl LogSink {
    fn into_make_writer(self) -> BoxMakeWriter {
        match self {
            LogSink::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogSink::Forward(writer) => BoxMakeWriter::new(writer),
        }
    }
}

/// Filter from `RUST_LOG` when set, else the configured level.
pub fn log_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Build a subscriber without installing it.
pub fn build_subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Plain => Box::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .event_format(PlainFormat)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Json => Box::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormat)
                    .with_writer(writer),
            ),
        ),
    }
}

/// Install the process-wide subscriber.
pub fn init_logging(
    config: &LoggingConfig,
    sink: LogSink,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = build_subscriber(config.format, log_filter(config), sink.into_make_writer());
    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn level_filter_drops_debug_records() {
        let capture = Capture::default();
        let subscriber =
            build_subscriber(LogFormat::Plain, EnvFilter::new("info"), capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
        });

        let text = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with(" - INFO - shown\n"), "{text}");
    }

    #[test]
    fn json_format_selected_from_config() {
        let capture = Capture::default();
        let subscriber = build_subscriber(LogFormat::Json, EnvFilter::new("info"), capture.clone());

        tracing::subscriber::with_default(subscriber, || tracing::error!(code = 7, "boom"));

        let text = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let record: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(record["levelname"], "ERROR");
        assert_eq!(record["message"], "boom");
        assert_eq!(record["code"], 7);
    }
}
