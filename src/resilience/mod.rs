//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Department lookup on cache miss:
//!     → circuit_breaker.rs (admit, or short-circuit without I/O)
//!     → timeouts.rs (bound the remote fetch)
//!     → outcome recorded back into circuit_breaker.rs
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every remote call has a deadline
//! - A timeout counts exactly like a network error
//! - No retries: the breaker plus a fallback value keeps the caller responsive

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{BreakerSettings, BreakerSnapshot, CallError, CircuitBreaker, CircuitState};
pub use timeouts::with_timeout;
