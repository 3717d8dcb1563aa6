//! User subsystem: the local records and the aggregation over them.
//!
//! # Data Flow
//! ```text
//! GET /api/users/{id}
//!     → service.rs get_aggregated_view
//!         → store.rs find_user_by_id        (absent → UserNotFound)
//!         → cache "department:{id}"        (hit → done)
//!         → CircuitBreaker → DepartmentClient (success → cache put)
//!         → failure/short-circuit → placeholder department (not cached)
//!     → AggregatedView { user, department }
//! ```

pub mod service;
pub mod store;
pub mod types;

pub use service::{AggregationError, AggregationService};
pub use store::{InMemoryUserStore, UserRepository, UserStoreError};
pub use types::{AggregatedView, NewUser, User, UserId, UserView};
