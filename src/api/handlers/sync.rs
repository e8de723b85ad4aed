//! Sync event ingestion handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::ApiResponse;
use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::validation::{SyncEventInput, validate_sync_event};

/// `POST /api/sync-event` — Ingest one sync report.
///
/// Validates the body against server receipt time (a future `timestamp`
/// is rejected before anything is persisted), then runs the
/// find-or-create / insert / last-seen sequence.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] with field details on malformed
/// input, or [`GatewayError::Persistence`] on storage failure.
pub async fn create_sync_event(
    State(state): State<AppState>,
    Json(input): Json<SyncEventInput>,
) -> Result<impl IntoResponse, GatewayError> {
    let event = validate_sync_event(&input, Utc::now()).map_err(GatewayError::Validation)?;

    let stored = state.sync_service.process_sync_event(event).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Sync event processed successfully", stored)),
    ))
}

/// Sync ingestion routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sync-event", post(create_sync_event))
}
