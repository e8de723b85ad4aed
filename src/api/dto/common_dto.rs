//! Shared DTO types used across multiple endpoints.

use serde::Serialize;

/// Success envelope wrapping every 2xx payload.
///
/// ```json
/// {"success": true, "message": "...", "data": { ... }}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true` for success responses.
    pub success: bool,
    /// Short human-readable outcome description.
    pub message: String,
    /// Endpoint-specific payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wraps `data` in a success envelope with the given message.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Pagination metadata echoed back in history responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Effective page size.
    pub limit: i64,
    /// Effective row offset.
    pub offset: i64,
    /// Total events for the device (from the stats rollup, not the page).
    pub total_events: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let body = ApiResponse::new("ok", serde_json::json!({"id": 1}));
        let Ok(json) = serde_json::to_value(&body) else {
            unreachable!("envelope must serialize");
        };
        assert_eq!(json.pointer("/success"), Some(&serde_json::json!(true)));
        assert_eq!(json.pointer("/message"), Some(&serde_json::json!("ok")));
        assert_eq!(json.pointer("/data/id"), Some(&serde_json::json!(1)));
    }
}
