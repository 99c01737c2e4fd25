//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI profile / overrides
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! All fields have defaults, so an empty file (or no file) is a valid
//! configuration for the plain profile.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::{
    ForwardConfig, ListenerConfig, LogFormat, LoggingConfig, MetricsConfig, Profile,
    ServiceConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
