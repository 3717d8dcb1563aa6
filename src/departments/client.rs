//! HTTP client for the remote department service.
//!
//! # Responsibilities
//! - Build `GET {base_url}/departments/{id}` requests
//! - Bound every fetch with the configured timeout
//! - Classify failures as network, timeout, not-found or remote fault

use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::config::DepartmentServiceConfig;
use crate::departments::types::{Department, DepartmentError};
use crate::resilience::with_timeout;

/// Longest remote error body kept in a `RemoteFault` message.
const MAX_FAULT_BODY: usize = 256;

/// Fetches department records from the remote service.
#[derive(Debug, Clone)]
pub struct DepartmentClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl DepartmentClient {
    /// Create a client from configuration.
    pub fn new(config: &DepartmentServiceConfig) -> Result<Self, DepartmentError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DepartmentError::InvalidUrl(format!("'{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DepartmentError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| DepartmentError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of one department. The id is percent-encoded as a single segment.
    pub fn department_url(&self, department_id: &str) -> Result<Url, DepartmentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DepartmentError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("departments")
            .push(department_id);
        Ok(url)
    }

    /// Fetch one department.
    pub async fn fetch(&self, department_id: &str) -> Result<Department, DepartmentError> {
        let url = self.department_url(department_id)?;
        tracing::debug!(url = %url, "Fetching department");

        with_timeout(self.timeout, self.send(url, department_id), |limit| {
            DepartmentError::Timeout(limit.as_millis() as u64)
        })
        .await
    }

    async fn send(&self, url: Url, department_id: &str) -> Result<Department, DepartmentError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DepartmentError::NotFound(department_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DepartmentError::RemoteFault {
                status: status.as_u16(),
                message: truncate(&body, MAX_FAULT_BODY),
            });
        }

        response
            .json::<Department>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    DepartmentError::RemoteFault {
                        status: status.as_u16(),
                        message: format!("invalid department body: {}", e),
                    }
                }
            })
    }

    fn transport_error(&self, e: reqwest::Error) -> DepartmentError {
        if e.is_timeout() {
            DepartmentError::Timeout(self.timeout.as_millis() as u64)
        } else {
            DepartmentError::Network(e.to_string())
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
