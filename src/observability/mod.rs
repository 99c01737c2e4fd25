//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handlers and background tasks produce:
//!     → logging.rs (subscriber: filter + layout + sink)
//!         → format.rs (plain or JSON lines)
//!         → stderr, or forward.rs (TCP to the log collector)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!         → Prometheus scrape endpoint
//! ```

pub mod format;
pub mod forward;
pub mod logging;
pub mod metrics;

pub use format::{JsonFormat, PlainFormat};
pub use forward::{ForwardError, ForwardWriter, ForwarderTask};
pub use logging::{build_subscriber, init_logging, log_filter, LogSink};
