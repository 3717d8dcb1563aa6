//! Standalone department service.
//!
//! Serves `POST /api/departments` and `GET /api/departments/{id}` from an
//! in-memory directory. This is the remote dependency the aggregation
//! service talks to.

use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use user_aggregator::config::ObservabilityConfig;
use user_aggregator::departments::{directory, DepartmentDirectory};
use user_aggregator::lifecycle::signals;
use user_aggregator::observability::logging;

#[derive(Parser)]
#[command(name = "department-service")]
#[command(about = "In-memory department service", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0:8082")]
    bind: String,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(&ObservabilityConfig {
        log_level: args.log_level.clone(),
        ..ObservabilityConfig::default()
    });

    let directory = Arc::new(DepartmentDirectory::new());
    let app = directory::router(directory).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&args.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Department service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::wait_for_shutdown_signal())
        .await?;

    tracing::info!("Department service stopped");
    Ok(())
}
