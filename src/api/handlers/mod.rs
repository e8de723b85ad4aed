//! REST endpoint handlers organized by resource.

pub mod device;
pub mod stats;
pub mod sync;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(sync::routes())
        .merge(device::routes())
        .merge(stats::routes())
}
