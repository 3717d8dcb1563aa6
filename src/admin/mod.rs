//! Operational endpoints: service status, breaker state, cache contents.
//! Mounted only when `admin.enabled`; every route needs the admin API key.

pub mod handlers;
pub mod auth;

use axum::{
    routing::get,
    Router,
    middleware,
};
use crate::http::server::AppState;
use self::handlers::*;
use self::auth::admin_auth_middleware;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/breaker", get(get_breaker))
        .route("/admin/cache", get(get_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
