//! Sync history response DTOs.

use serde::Serialize;

use super::common_dto::PaginationMeta;
use crate::persistence::models::{DeviceStats, SyncEvent};

/// Payload for `GET /api/device/{id}/sync-history`: one page of raw
/// history plus the device rollup and pagination echo.
#[derive(Debug, Clone, Serialize)]
pub struct SyncHistoryResponse {
    /// Device the history belongs to.
    pub device_id: String,
    /// Aggregate rollup over all of the device's events.
    pub stats: DeviceStats,
    /// Requested page of events, newest first.
    pub sync_history: Vec<SyncEvent>,
    /// Effective pagination parameters and total event count.
    pub pagination: PaginationMeta,
}
