//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Log forwarder write fails:
//!     → backoff.rs (exponential delay with jitter)
//!     → reconnect attempt
//!     → success resets the schedule
//! ```

pub mod backoff;

pub use backoff::Backoff;
