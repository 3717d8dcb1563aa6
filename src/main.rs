//! User aggregation service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                 USER AGGREGATOR                       │
//!   GET /api/users/1  │  ┌────────┐   ┌──────────────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│ AggregationService│──▶│ user store │  │
//!                     │  └────────┘   └────────┬─────────┘   └────────────┘  │
//!                     │                        │ department:{id}              │
//!                     │                        ▼                              │
//!                     │                 ┌────────────┐ hit                    │
//!                     │                 │   cache    │────────▶ view           │
//!                     │                 └─────┬──────┘                        │
//!                     │                       │ miss                          │
//!                     │                       ▼                               │
//!                     │              ┌─────────────────┐     ┌────────────┐   │   department
//!                     │              │ circuit breaker │────▶│ dept client│───┼──▶ service
//!                     │              └────────┬────────┘     └────────────┘   │
//!                     │                       │ open / failure                │
//!                     │                       ▼                               │
//!                     │              placeholder department (not cached)      │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use user_aggregator::config::{load_config, watcher::ConfigWatcher, ServiceConfig};
use user_aggregator::lifecycle::{signals, Shutdown, StartupError};
use user_aggregator::observability::{logging, metrics};
use user_aggregator::HttpServer;

#[derive(Parser)]
#[command(name = "user-aggregator")]
#[command(about = "Serves users combined with their departments", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).map_err(StartupError::from)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("user-aggregator v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        department_service = %config.department_service.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(w) => (Some(w), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config)?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
