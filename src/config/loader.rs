//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate a TOML document.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.circuit_breaker.name, "departmentService");
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [department_service]
            base_url = "http://departments.internal:9000/api"
            timeout_ms = 500
            connect_timeout_ms = 200

            [circuit_breaker]
            failure_threshold = 3
            cooldown_ms = 10000
            "#,
        )
        .unwrap();

        assert_eq!(config.department_service.base_url, "http://departments.internal:9000/api");
        assert_eq!(config.department_service.timeout_ms, 500);
        assert_eq!(config.department_service.connect_timeout_ms, 200);
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.circuit_breaker.cooldown().as_secs(), 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[circuit_breaker]\nfailure_threshold = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("circuit_breaker.failure_threshold"));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("[circuit_breaker\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("aggregator-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:18081\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:18081");

        std::fs::remove_file(&path).unwrap_or_default();
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
