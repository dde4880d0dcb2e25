//! datawatchman API server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──▶ request id ─▶ trace ─▶ timeout ─▶ security headers ─▶ metrics
//!                                                                      │
//!                    ┌─────────────────────────────────────────────────┘
//!                    ▼
//!              /api router ─▶ CORS ─▶ gate (feature, origin, rate) ─▶ handler
//!                                                                      │
//!          ┌──────────────────────┬──────────────────────┬─────────────┘
//!          ▼                      ▼                      ▼
//!    PostgreSQL stores     BAN / Géoplateforme      INSEE / Paris
//!    (submissions, BDUK)   (address, BD TOPO)       open data
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use datawatchman::config;
use datawatchman::http::{AppState, HttpServer};
use datawatchman::lifecycle::{signals, Shutdown};
use datawatchman::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "datawatchman", version, about = "Public-data API service")]
struct Args {
    /// TOML configuration file. Defaults plus environment overrides without it.
    #[arg(short, long, env = "DATAWATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "datawatchman starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        allowed_origins = config.cors.allowed_origins.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState::from_config(config)?;
    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    HttpServer::new(state).run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
