//! User aggregation service.
//!
//! # Responsibilities
//! - Create users in the local store
//! - Combine a local user with their remote department
//! - Serve departments from the cache when possible
//! - Guard remote fetches with the circuit breaker
//! - Substitute a placeholder department when the remote side fails
//!
//! # Design Decisions
//! - Only a verified remote success writes to the cache
//! - A missing user fails before any cache or breaker involvement
//! - Concurrent misses for the same department may each fetch; no dedup

use std::sync::Arc;
use thiserror::Error;

use crate::cache::{department_key, CacheStore};
use crate::departments::{Department, DepartmentClient};
use crate::observability::metrics;
use crate::resilience::{CallError, CircuitBreaker};
use crate::users::store::{UserRepository, UserStoreError};
use crate::users::types::{AggregatedView, NewUser, User, UserId, UserView};

/// Errors surfaced to callers of the aggregation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("invalid user: {0}")]
    InvalidUser(String),
}

impl From<UserStoreError> for AggregationError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateEmail(email) => AggregationError::DuplicateEmail(email),
        }
    }
}

/// Orchestrates user lookups with their department.
pub struct AggregationService {
    users: Arc<dyn UserRepository>,
    departments: DepartmentClient,
    breaker: Arc<CircuitBreaker>,
    cache: CacheStore<Department>,
}

impl AggregationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        departments: DepartmentClient,
        breaker: Arc<CircuitBreaker>,
        cache: CacheStore<Department>,
    ) -> Self {
        Self {
            users,
            departments,
            breaker,
            cache,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn cache(&self) -> &CacheStore<Department> {
        &self.cache
    }

    /// Validate and store a new user.
    pub fn create_user(&self, new: NewUser) -> Result<User, AggregationError> {
        let email = new.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AggregationError::InvalidUser("a valid email is required".into()));
        }
        if new.department_id.trim().is_empty() {
            return Err(AggregationError::InvalidUser("departmentId is required".into()));
        }

        let new = NewUser {
            email: email.to_string(),
            department_id: new.department_id.trim().to_string(),
            ..new
        };
        let user = self.users.save_user(new)?;
        tracing::info!(user_id = user.id, department_id = %user.department_id, "User created");
        Ok(user)
    }

    /// Look up a user and attach their department.
    ///
    /// Fails only when the user does not exist. Any remote failure yields the
    /// unavailable placeholder department instead of an error.
    pub async fn get_aggregated_view(&self, user_id: UserId) -> Result<AggregatedView, AggregationError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .ok_or(AggregationError::UserNotFound(user_id))?;

        let department = self.resolve_department(&user.department_id).await;

        Ok(AggregatedView {
            user: UserView::from(&user),
            department,
        })
    }

    async fn resolve_department(&self, department_id: &str) -> Department {
        let key = department_key(department_id);

        if let Some(department) = self.cache.get(&key) {
            metrics::record_cache_lookup(true);
            tracing::debug!(key = %key, "Department served from cache");
            return department;
        }
        metrics::record_cache_lookup(false);

        let result = self
            .breaker
            .execute(|| self.departments.fetch(department_id))
            .await;

        match result {
            Ok(department) => {
                self.cache.put(key, department.clone());
                department
            }
            Err(CallError::ShortCircuited(breaker)) => {
                metrics::record_fallback("short_circuited");
                tracing::warn!(
                    breaker = %breaker,
                    department_id = %department_id,
                    "Department lookup short-circuited, serving fallback"
                );
                Department::unavailable()
            }
            Err(CallError::Failed(e)) => {
                metrics::record_fallback(e.kind());
                tracing::warn!(
                    breaker = %self.breaker.name(),
                    department_id = %department_id,
                    error_kind = e.kind(),
                    error = %e,
                    "Department lookup failed, serving fallback"
                );
                Department::unavailable()
            }
        }
    }
}
