//! Circuit breaker for remote dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast without I/O
//! - Half-Open: one trial call probes whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= failure_threshold
//! Open → Half-Open: cooldown elapsed since opened_at (checked on admission)
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (opened_at reset)
//! ```
//!
//! # Design Decisions
//! - One breaker per named dependency, shared via Arc
//! - All transitions happen under one mutex; it is never held across an await
//! - Single trial in Half-Open; concurrent callers are short-circuited
//! - A trial whose future is dropped frees the slot for the next caller

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for a breaker. Both values come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive failures that trip the breaker (at least 1).
    pub failure_threshold: u32,
    /// Time spent open before a trial call is allowed.
    pub cooldown: Duration,
}

impl From<&CircuitBreakerConfig> for BreakerSettings {
    fn from(config: &CircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold.max(1),
            cooldown: config.cooldown(),
        }
    }
}

/// Outcome of a guarded call that did not succeed.
#[derive(Debug, Error)]
pub enum CallError<E> {
    /// The breaker refused the call; the operation never ran.
    #[error("circuit '{0}' is open")]
    ShortCircuited(String),

    /// The operation ran and failed.
    #[error("{0}")]
    Failed(E),
}

impl<E> CallError<E> {
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, CallError::ShortCircuited(_))
    }
}

/// Point-in-time view of a breaker, for admin endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    /// Milliseconds since the breaker last opened, if open or half-open.
    pub open_for_ms: Option<u64>,
}

/// Why a call was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permit {
    Normal,
    Trial,
}

#[derive(Debug)]
struct BreakerState {
    status: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    settings: BreakerSettings,
}

/// A per-dependency circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        let name = name.into();
        metrics::record_breaker_state(&name, CircuitState::Closed);
        Self {
            name,
            state: Mutex::new(BreakerState {
                status: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
                settings: BreakerSettings {
                    failure_threshold: settings.failure_threshold.max(1),
                    ..settings
                },
            }),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(config.name.clone(), BreakerSettings::from(config))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state. An open breaker whose cooldown has elapsed still
    /// reports `Open` until a caller is admitted as the trial.
    pub fn state(&self) -> CircuitState {
        self.lock().status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn settings(&self) -> BreakerSettings {
        self.lock().settings
    }

    /// Replace threshold and cooldown. State and counters are kept.
    pub fn update_settings(&self, settings: BreakerSettings) {
        let mut state = self.lock();
        state.settings = BreakerSettings {
            failure_threshold: settings.failure_threshold.max(1),
            ..settings
        };
        tracing::info!(
            breaker = %self.name,
            failure_threshold = state.settings.failure_threshold,
            cooldown_ms = state.settings.cooldown.as_millis() as u64,
            "Circuit breaker settings updated"
        );
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: state.status,
            consecutive_failures: state.consecutive_failures,
            failure_threshold: state.settings.failure_threshold,
            cooldown_ms: state.settings.cooldown.as_millis() as u64,
            open_for_ms: state.opened_at.map(|t| t.elapsed().as_millis() as u64),
        }
    }

    /// Run `operation` if the breaker admits it.
    ///
    /// Returns `CallError::ShortCircuited` without invoking `operation` when
    /// the breaker is open, or half-open with a trial already in flight.
    /// Every error returned by `operation` counts as one failure.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let permit = match self.try_acquire() {
            Some(permit) => permit,
            None => {
                metrics::record_breaker_call(&self.name, "short_circuited");
                tracing::debug!(breaker = %self.name, "Call short-circuited");
                return Err(CallError::ShortCircuited(self.name.clone()));
            }
        };

        let mut guard = TrialGuard {
            breaker: self,
            armed: permit == Permit::Trial,
        };
        let result = operation().await;
        guard.armed = false;

        match &result {
            Ok(_) => {
                metrics::record_breaker_call(&self.name, "success");
                self.on_success(permit);
            }
            Err(e) => {
                metrics::record_breaker_call(&self.name, "failure");
                self.on_failure(permit, e);
            }
        }

        result.map_err(CallError::Failed)
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // State is only ever updated field-by-field with no await in between.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_acquire(&self) -> Option<Permit> {
        let mut state = self.lock();
        match state.status {
            CircuitState::Closed => Some(Permit::Normal),
            CircuitState::Open => {
                let cooled_down = state
                    .opened_at
                    .map_or(true, |opened| opened.elapsed() >= state.settings.cooldown);
                if !cooled_down {
                    return None;
                }
                state.status = CircuitState::HalfOpen;
                state.trial_in_flight = true;
                metrics::record_breaker_state(&self.name, CircuitState::HalfOpen);
                tracing::info!(breaker = %self.name, "Circuit half-open, admitting trial call");
                Some(Permit::Trial)
            }
            CircuitState::HalfOpen => {
                if state.trial_in_flight {
                    None
                } else {
                    state.trial_in_flight = true;
                    Some(Permit::Trial)
                }
            }
        }
    }

    fn on_success(&self, permit: Permit) {
        let mut state = self.lock();
        match permit {
            Permit::Trial => {
                state.status = CircuitState::Closed;
                state.consecutive_failures = 0;
                state.opened_at = None;
                state.trial_in_flight = false;
                metrics::record_breaker_state(&self.name, CircuitState::Closed);
                tracing::info!(breaker = %self.name, "Trial call succeeded, circuit closed");
            }
            Permit::Normal => {
                // A call admitted before the breaker opened cannot close it.
                if state.status == CircuitState::Closed {
                    state.consecutive_failures = 0;
                }
            }
        }
    }

    fn on_failure(&self, permit: Permit, error: &dyn fmt::Display) {
        let mut state = self.lock();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);

        match permit {
            Permit::Trial => {
                state.status = CircuitState::Open;
                state.opened_at = Some(Instant::now());
                state.trial_in_flight = false;
                metrics::record_breaker_state(&self.name, CircuitState::Open);
                tracing::warn!(
                    breaker = %self.name,
                    error = %error,
                    cooldown_ms = state.settings.cooldown.as_millis() as u64,
                    "Trial call failed, circuit re-opened"
                );
            }
            Permit::Normal => {
                tracing::warn!(
                    breaker = %self.name,
                    error = %error,
                    consecutive_failures = state.consecutive_failures,
                    failure_threshold = state.settings.failure_threshold,
                    "Guarded call failed"
                );
                if state.status == CircuitState::Closed
                    && state.consecutive_failures >= state.settings.failure_threshold
                {
                    state.status = CircuitState::Open;
                    state.opened_at = Some(Instant::now());
                    metrics::record_breaker_state(&self.name, CircuitState::Open);
                    tracing::warn!(
                        breaker = %self.name,
                        consecutive_failures = state.consecutive_failures,
                        "Failure threshold reached, circuit opened"
                    );
                }
            }
        }
    }

    fn abandon_trial(&self) {
        let mut state = self.lock();
        if state.status == CircuitState::HalfOpen {
            state.trial_in_flight = false;
            tracing::debug!(breaker = %self.name, "Trial call abandoned before completion");
        }
    }
}

/// Releases the half-open trial slot if the trial future is dropped mid-call.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.abandon_trial();
        }
    }
}
