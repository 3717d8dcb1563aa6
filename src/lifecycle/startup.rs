//! Startup orchestration.
//!
//! Builds the shared state in dependency order: department client, breaker,
//! cache, user store, then the aggregation service on top. Any error is fatal.

use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::CacheStore;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServiceConfig};
use crate::departments::{DepartmentClient, DepartmentError};
use crate::http::server::AppState;
use crate::resilience::CircuitBreaker;
use crate::users::{AggregationService, InMemoryUserStore, UserRepository};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("department client: {0}")]
    DepartmentClient(#[from] DepartmentError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Wire up the service. The cache and breaker created here live for the
/// rest of the process.
///
/// The configuration is validated again here, since callers may build it in
/// code rather than through `load_config`.
pub fn build_state(config: ServiceConfig) -> Result<AppState, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    let client = DepartmentClient::new(&config.department_service)?;
    let breaker = Arc::new(CircuitBreaker::from_config(&config.circuit_breaker));
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserStore::new());
    let service = AggregationService::new(users, client, breaker, CacheStore::new());

    tracing::info!(
        department_service = %config.department_service.base_url,
        timeout_ms = config.department_service.timeout_ms,
        breaker = %config.circuit_breaker.name,
        failure_threshold = config.circuit_breaker.failure_threshold,
        cooldown_ms = config.circuit_breaker.cooldown_ms,
        "Aggregation service initialized"
    );

    Ok(AppState {
        service: Arc::new(service),
        config: Arc::new(ArcSwap::from_pointee(config)),
    })
}
