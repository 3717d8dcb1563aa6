use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use crate::http::server::AppState;
use crate::resilience::{BreakerSnapshot, CircuitState};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub department_service: String,
    pub breaker_state: CircuitState,
}

#[derive(Serialize)]
pub struct CacheSummary {
    pub entries: usize,
    pub keys: Vec<String>,
}

pub async fn get_status(
    State(state): State<AppState>,
) -> Json<SystemStatus> {
    let config = state.config.load();
    let breaker_state = state.service.breaker().state();
    // Requests still succeed while open, just with placeholder departments.
    let status = if breaker_state == CircuitState::Closed {
        "operational"
    } else {
        "degraded"
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        department_service: config.department_service.base_url.clone(),
        breaker_state,
    })
}

pub async fn get_breaker(
    State(state): State<AppState>,
) -> Json<BreakerSnapshot> {
    Json(state.service.breaker().snapshot())
}

pub async fn get_cache(
    State(state): State<AppState>,
) -> Json<CacheSummary> {
    let cache = state.service.cache();
    Json(CacheSummary {
        entries: cache.len(),
        keys: cache.keys(),
    })
}
