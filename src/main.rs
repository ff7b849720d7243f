//! Classifieds Gateway
//!
//! Admission layer for the classifieds marketplace API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────▶ http server (request id, timeout, trace)
//!               │
//!               ├─ OPTIONS ──────────────▶ 204 preflight
//!               ├─ static prefix ────────▶ ServeDir
//!               ▼
//!           maintenance gate ──blocked──▶ 503 JSON / HTML
//!               │
//!               ▼
//!           route table ──no match─────▶ 404
//!               │
//!               ▼
//!           rate limiter ──exhausted───▶ 429
//!               │
//!               ▼
//!           handler
//!
//!     SQLite: rate/<GROUP>.sqlite (counters), app.sqlite (users, maintenance)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use classifieds_gateway::config::{load_config, loader::finalize, GatewayConfig};
use classifieds_gateway::lifecycle::{build_state, wait_for_signal, Shutdown};
use classifieds_gateway::observability::{logging, metrics};
use classifieds_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "classifieds-gateway")]
#[command(about = "Request admission gateway for the classifieds API", long_about = None)]
struct Args {
    /// Path to a TOML config file; built-in defaults when omitted
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => finalize(GatewayConfig::default())?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(config.observability.log_format);
    tracing::info!("classifieds-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );

    let state = build_state(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    HttpServer::new(&config, state)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
