//! User aggregation service library.
//!
//! Combines locally stored users with departments owned by a separately
//! deployed department service, shielding callers from that service's
//! failures with a circuit breaker, a lookup cache and a placeholder fallback.

pub mod admin;
pub mod cache;
pub mod config;
pub mod departments;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod users;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
