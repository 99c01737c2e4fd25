//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (x-request-id set & propagated)
//!     → observability::metrics (request instrumentation, when enabled)
//!     → handlers.rs (greeting)
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::{Greeting, GREETING};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
