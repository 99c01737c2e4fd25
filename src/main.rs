//! Greeting service.
//!
//! A small HTTP service answering `GET /` with a fixed JSON greeting.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!   GET /         │  request-id → trace span → [metrics] → root  │
//!   ─────────────▶│                                     handler  │
//!                 │                                       │      │
//!   GET /metrics  │  Prometheus recorder ◀────────────────┤      │
//!   ─────────────▶│  (backend profile)                    │      │
//!                 │                                       ▼      │
//!                 │                      tracing subscriber      │
//!                 │                      plain → stderr          │
//!                 │                      json  → TCP forwarder ──┼──▶ logstash:5044
//!                 └──────────────────────────────────────────────┘
//! ```
//!
//! # Profiles
//! - `plain`: `asctime - levelname - message` on stderr, no metrics
//! - `backend`: JSON records forwarded to the collector, `/metrics` exposed

use std::path::PathBuf;

use clap::Parser;

use greeting_service::config::{resolve_config, ConfigOverrides, Profile};
use greeting_service::lifecycle::startup;

#[derive(Parser, Debug)]
#[command(name = "greeting-service", version, about = "Static greeting HTTP service", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Variant preset (overrides format, forwarding and metrics switches)
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Listener address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        profile: cli.profile,
        bind_address: cli.bind,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    startup::run(config).await?;
    Ok(())
}
