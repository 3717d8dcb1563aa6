//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Mount admin routes when enabled
//! - Apply reloaded configuration while running
//! - Serve until the shutdown signal fires

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::ServiceConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::ApiError;
use crate::lifecycle::startup::{build_state, StartupError};
use crate::observability::metrics;
use crate::resilience::BreakerSettings;
use crate::users::{AggregatedView, AggregationService, NewUser, User, UserId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AggregationService>,
    /// Current configuration; swapped on reload.
    pub config: Arc<ArcSwap<ServiceConfig>>,
}

impl AppState {
    /// Apply a reloaded configuration.
    ///
    /// Breaker threshold and cooldown take effect immediately. Listener and
    /// department service changes are recorded but need a restart.
    pub fn apply_config(&self, new_config: ServiceConfig) {
        let current = self.config.load_full();

        if current.listener != new_config.listener
            || current.department_service != new_config.department_service
        {
            tracing::warn!("Listener or department service settings changed; restart required to apply them");
        }

        if current.circuit_breaker != new_config.circuit_breaker {
            if current.circuit_breaker.name != new_config.circuit_breaker.name {
                tracing::warn!(
                    breaker = %current.circuit_breaker.name,
                    "Circuit breaker cannot be renamed at runtime"
                );
            }
            self.service
                .breaker()
                .update_settings(BreakerSettings::from(&new_config.circuit_breaker));
        }

        self.config.store(Arc::new(new_config));
        tracing::info!("Configuration reloaded");
    }
}

/// HTTP server for the aggregation service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, StartupError> {
        Ok(Self::with_state(build_state(config)?))
    }

    /// Create a server around already-built state.
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.load_full();
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/api/users", post(create_user))
            .route("/api/users/{id}", get(get_user))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(admin::setup_admin_router(state));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(track_metrics))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Reloaded configurations arriving on `config_updates` are applied while
    /// serving. Returns once `shutdown` fires and in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                state.apply_config(new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.create_user(new_user)?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<AggregatedView>, ApiError> {
    Ok(Json(state.service.get_aggregated_view(user_id).await?))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
