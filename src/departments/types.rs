//! Department records and the errors a department lookup can produce.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name carried by the placeholder department served when the remote
/// service cannot be reached.
pub const UNAVAILABLE_DEPARTMENT_NAME: &str =
    "Department Service is unavailable. Please try again later.";

/// A department as owned by the remote department service.
///
/// The older `departmentName`/`departmentAddress`/`departmentCode` field names
/// are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: u64,
    #[serde(alias = "departmentName")]
    pub name: String,
    #[serde(default, alias = "departmentAddress", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, alias = "departmentCode", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Department {
    /// Sentinel department substituted when the real one is unavailable.
    pub fn unavailable() -> Self {
        Self {
            id: 0,
            name: UNAVAILABLE_DEPARTMENT_NAME.to_string(),
            address: None,
            code: None,
        }
    }

    /// True only for the placeholder itself; a real department may use id 0.
    pub fn is_unavailable(&self) -> bool {
        self.id == 0 && self.name == UNAVAILABLE_DEPARTMENT_NAME
    }
}

/// Payload for creating a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    #[serde(alias = "departmentName")]
    pub name: String,
    #[serde(default, alias = "departmentAddress", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, alias = "departmentCode", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Errors that can occur while fetching a department.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepartmentError {
    /// Connection refused, reset, DNS failure and similar.
    #[error("network error: {0}")]
    Network(String),

    /// The fetch did not complete within the configured deadline.
    #[error("department service timed out after {0} ms")]
    Timeout(u64),

    /// The remote service reports no such department.
    #[error("department '{0}' not found")]
    NotFound(String),

    /// The remote service answered with an error or an unreadable body.
    #[error("department service fault (status {status}): {message}")]
    RemoteFault { status: u16, message: String },

    /// The configured base address cannot be used to build request URLs.
    #[error("invalid department service URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl DepartmentError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DepartmentError::Network(_) => "network",
            DepartmentError::Timeout(_) => "timeout",
            DepartmentError::NotFound(_) => "not_found",
            DepartmentError::RemoteFault { .. } => "remote_fault",
            DepartmentError::InvalidUrl(_) => "invalid_url",
            DepartmentError::Client(_) => "client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        let dept = Department::unavailable();
        assert_eq!(dept.id, 0);
        assert!(dept.is_unavailable());
        assert_eq!(
            serde_json::to_value(&dept).unwrap(),
            serde_json::json!({
                "id": 0,
                "name": "Department Service is unavailable. Please try again later."
            })
        );
    }

    #[test]
    fn test_real_department_with_id_zero_is_not_placeholder() {
        let dept: Department = serde_json::from_str(r#"{"id":0,"name":"Head Office"}"#).unwrap();
        assert!(!dept.is_unavailable());
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let dept: Department = serde_json::from_str(
            r#"{"id":5,"departmentName":"Engineering","departmentCode":"ENG-001"}"#,
        )
        .unwrap();
        assert_eq!(dept.name, "Engineering");
        assert_eq!(dept.code.as_deref(), Some("ENG-001"));
        assert_eq!(dept.address, None);
    }

    #[test]
    fn test_error_display() {
        let err = DepartmentError::Timeout(2000);
        assert_eq!(err.to_string(), "department service timed out after 2000 ms");
        assert_eq!(err.kind(), "timeout");

        let err = DepartmentError::RemoteFault {
            status: 500,
            message: "boom".into(),
        };
        assert!(err.to_string().contains("500"));
    }
}
