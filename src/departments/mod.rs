//! Department subsystem: the remote dependency and how it is reached.
//!
//! # Data Flow
//! ```text
//! AggregationService (cache miss)
//!     → CircuitBreaker::execute
//!     → client.rs  GET {base_url}/departments/{id}  (bounded by timeout)
//!     → remote department service (directory.rs, separate process)
//!     → Department | DepartmentError
//! ```
//!
//! # Design Decisions
//! - The client never retries; the breaker decides whether calls happen at all
//! - 404 → NotFound, other non-2xx and unreadable bodies → RemoteFault
//! - Connection failures → Network, elapsed deadline → Timeout

pub mod client;
pub mod directory;
pub mod types;

pub use client::DepartmentClient;
pub use directory::DepartmentDirectory;
pub use types::{Department, DepartmentError, NewDepartment, UNAVAILABLE_DEPARTMENT_NAME};
