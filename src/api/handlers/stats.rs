//! System-wide statistics handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ApiResponse;
use crate::app_state::AppState;
use crate::error::GatewayError;

/// `GET /api/stats` — Process-wide rollup: device count, event totals,
/// overall success rate, and a recency-ordered device sample.
///
/// # Errors
///
/// Returns [`GatewayError::Persistence`] on storage failure.
pub async fn get_system_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let stats = state.sync_service.system_stats().await?;

    Ok(Json(ApiResponse::new(
        "System statistics retrieved successfully",
        stats,
    )))
}

/// Statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_system_stats))
}
