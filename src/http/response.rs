//! Error responses.
//!
//! Every failure leaves the service as `{"error": <kind>, "message": <text>}`
//! with a matching status code. Remote department failures never reach this
//! module; they are absorbed into a fallback department upstream.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::users::AggregationError;

/// An error that maps onto an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }
}

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        let message = err.to_string();
        match err {
            AggregationError::UserNotFound(_) => Self::not_found(message),
            AggregationError::DuplicateEmail(_) => Self::conflict(message),
            AggregationError::InvalidUser(_) => Self::bad_request(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.kind,
            message: &self.message,
        });
        (self.status, body).into_response()
    }
}
