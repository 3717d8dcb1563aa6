//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! Every problem is reported, not just the first one.

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.department_service.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::new(
                    "department_service.base_url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            } else if url.cannot_be_a_base() {
                errors.push(ValidationError::new(
                    "department_service.base_url",
                    "URL cannot carry path segments",
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new(
            "department_service.base_url",
            format!("invalid URL '{}': {}", config.department_service.base_url, e),
        )),
    }

    if config.department_service.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "department_service.timeout_ms",
            "must be greater than zero",
        ));
    }

    if config.department_service.connect_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "department_service.connect_timeout_ms",
            "must be greater than zero",
        ));
    }

    if config.department_service.timeout_ms > 0
        && config.department_service.connect_timeout_ms > config.department_service.timeout_ms
    {
        errors.push(ValidationError::new(
            "department_service.connect_timeout_ms",
            format!(
                "must not exceed department_service.timeout_ms ({} ms)",
                config.department_service.timeout_ms
            ),
        ));
    }

    // A remote fetch must resolve (success or counted failure) before the
    // inbound request deadline drops it.
    if config.department_service.timeout_ms >= config.timeouts.request_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "department_service.timeout_ms",
            format!(
                "must be shorter than timeouts.request_secs ({} s)",
                config.timeouts.request_secs
            ),
        ));
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.failure_threshold",
            "must be at least 1",
        ));
    }

    if config.circuit_breaker.cooldown_ms == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.cooldown_ms",
            "must be greater than zero",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when admin is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.circuit_breaker.failure_threshold = 0;
        config.circuit_breaker.cooldown_ms = 0;
        config.department_service.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "department_service.timeout_ms",
                "circuit_breaker.failure_threshold",
                "circuit_breaker.cooldown_ms",
            ]
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = ServiceConfig::default();
        config.department_service.base_url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "department_service.base_url");

        config.department_service.base_url = "mailto:ops@example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("scheme"));
    }

    #[test]
    fn test_remote_timeout_must_fit_request_deadline() {
        let mut config = ServiceConfig::default();
        config.department_service.timeout_ms = 5000;
        config.timeouts.request_secs = 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "department_service.timeout_ms");
        assert!(errors[0].message.contains("timeouts.request_secs"));

        config.department_service.timeout_ms = 1000;
        assert!(validate_config(&config).is_err(), "equal deadlines still race");

        config.department_service.timeout_ms = 900;
        config.department_service.connect_timeout_ms = 500;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_connect_timeout_bounded_by_total() {
        let mut config = ServiceConfig::default();
        config.department_service.timeout_ms = 300;
        config.department_service.connect_timeout_ms = 1000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "department_service.connect_timeout_ms");
    }

    #[test]
    fn test_admin_key_required_when_enabled() {
        let mut config = ServiceConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "admin.api_key: must be set when admin is enabled");
    }
}
