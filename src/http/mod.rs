//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign/propagate x-request-id)
//!     → server.rs (trace span, timeout, metrics, handlers)
//!     → users::AggregationService
//!     → JSON body, or response.rs error body
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
