//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::SyncService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sync service for all business logic.
    pub sync_service: Arc<SyncService>,
}
