//! Per-device query handlers: history and repeated failures.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ApiResponse;
use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::validation::{
    HistoryQuery, ThresholdQuery, validate_device_id, validate_history_query, validate_threshold,
};

/// `GET /api/device/{id}/sync-history` — One page of a device's history
/// plus its aggregate stats and pagination echo.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] on out-of-range pagination or
/// malformed dates, or [`GatewayError::Persistence`] on storage failure.
pub async fn get_device_sync_history(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    validate_device_id(&device_id).map_err(GatewayError::Validation)?;
    let filter = validate_history_query(&query).map_err(GatewayError::Validation)?;

    let history = state
        .sync_service
        .device_sync_history(&device_id, filter)
        .await?;

    Ok(Json(ApiResponse::new(
        "Sync history retrieved successfully",
        history,
    )))
}

/// `GET /api/devices/repeated-failures` — Devices with at least
/// `threshold` failed syncs, worst first.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] on an out-of-range threshold, or
/// [`GatewayError::Persistence`] on storage failure.
pub async fn get_devices_with_repeated_failures(
    State(state): State<AppState>,
    Query(query): Query<ThresholdQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let threshold = validate_threshold(&query).map_err(GatewayError::Validation)?;

    let report = state
        .sync_service
        .devices_with_repeated_failures(threshold)
        .await?;

    Ok(Json(ApiResponse::new(
        "Devices with repeated failures retrieved successfully",
        report,
    )))
}

/// Device query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/device/{id}/sync-history", get(get_device_sync_history))
        .route(
            "/devices/repeated-failures",
            get(get_devices_with_repeated_failures),
        )
}
