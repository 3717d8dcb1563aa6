//! Lookup cache subsystem.
//!
//! # Data Flow
//! ```text
//! AggregationService
//!     → keys.rs (derive "department:{id}")
//!     → store.rs get → hit: served as-is, no remote call
//!                    → miss: remote fetch, put only on verified success
//! ```
//!
//! # Design Decisions
//! - One instance created at startup and shared by cloning (Arc inside)
//! - No TTL and no eviction; staleness is never checked
//! - Fallback values are never written

pub mod keys;
pub mod store;

pub use keys::department_key;
pub use store::CacheStore;
