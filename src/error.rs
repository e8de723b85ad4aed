//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and the structured JSON error
//! envelope shared by every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// One field-level validation failure.
///
/// Returned in the `details` array of a 400 response, one entry per
/// offending field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// The rejected value as received, `null` when the field was absent.
    pub value: serde_json::Value,
}

impl FieldError {
    /// Builds a field error from a field name, message, and rejected value.
    #[must_use]
    pub fn new(field: &str, message: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            value,
        }
    }
}

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": "Validation failed",
///   "details": [{"field": "timestamp", "message": "...", "value": "..."}]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false` for error responses.
    pub success: bool,
    /// Short error category exposed to the client.
    pub error: String,
    /// Field-level details, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Variant      | HTTP Status               |
/// |--------------|---------------------------|
/// | Validation   | 400 Bad Request           |
/// | NotFound     | 404 Not Found             |
/// | Persistence  | 500 Internal Server Error |
/// | Internal     | 500 Internal Server Error |
///
/// Persistence and internal details are logged at the point of failure
/// and never exposed to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request input failed validation; never reaches the data layer.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// No route or resource matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// Persistence layer failure (constraint violation, connection
    /// failure, pool exhaustion).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation(details) => ErrorResponse {
                success: false,
                error: "Validation failed".to_string(),
                details: Some(details),
            },
            Self::NotFound(what) => ErrorResponse {
                success: false,
                error: format!("Not found: {what}"),
                details: None,
            },
            // Internal detail was logged where the failure happened;
            // the client only sees a generic message.
            Self::Persistence(_) | Self::Internal(_) => ErrorResponse {
                success: false,
                error: "Internal server error".to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = GatewayError::Validation(vec![FieldError::new(
            "timestamp",
            "timestamp must not be in the future",
            serde_json::Value::Null,
        )]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_maps_to_internal_server_error() {
        let err = GatewayError::Persistence("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn persistence_detail_is_not_exposed() {
        let err = GatewayError::Persistence("password=hunter2".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_envelope_serializes_details() {
        let body = ErrorResponse {
            success: false,
            error: "Validation failed".to_string(),
            details: Some(vec![FieldError::new(
                "total_errors",
                "must be a non-negative integer",
                serde_json::json!(-1),
            )]),
        };
        let json = serde_json::to_value(&body);
        let Ok(json) = json else {
            unreachable!("envelope must serialize");
        };
        assert_eq!(json.pointer("/success"), Some(&serde_json::json!(false)));
        assert_eq!(
            json.pointer("/details/0/field"),
            Some(&serde_json::json!("total_errors"))
        );
        assert_eq!(json.pointer("/details/0/value"), Some(&serde_json::json!(-1)));
    }
}
