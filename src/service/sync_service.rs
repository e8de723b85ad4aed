//! Sync service: orchestrates repository calls into response payloads.

use sqlx::PgPool;

use crate::api::dto::{
    PaginationMeta, RepeatedFailuresResponse, SyncHistoryResponse, SystemStatsResponse,
};
use crate::error::GatewayError;
use crate::persistence::models::{HistoryFilter, NewSyncEvent, SyncEvent};
use crate::persistence::{DeviceRepository, SyncEventRepository};

/// Number of per-device rows fetched for the system rollup.
const BULK_STATS_LIMIT: i64 = 100;

/// Orchestration layer for all sync operations.
///
/// Stateless coordinator: owns the two repositories and composes their
/// results into response payloads. Errors are propagated unchanged.
#[derive(Debug, Clone)]
pub struct SyncService {
    devices: DeviceRepository,
    events: SyncEventRepository,
}

impl SyncService {
    /// Creates a new service over the shared connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            devices: DeviceRepository::new(pool.clone()),
            events: SyncEventRepository::new(pool),
        }
    }

    /// Ingests one validated sync event.
    ///
    /// Three-step ordering is a correctness requirement: the device row
    /// must exist before the event insert (foreign key), and last-seen
    /// must reflect the event just recorded. A failure after step one
    /// leaves the device registered — a device once seen is never rolled
    /// back — and the error propagates without compensation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] if any step fails.
    pub async fn process_sync_event(
        &self,
        event: NewSyncEvent,
    ) -> Result<SyncEvent, GatewayError> {
        self.devices.find_or_create(&event.device_id).await?;

        let stored = self.events.create(&event).await?;

        self.devices.update_last_seen(&event.device_id).await?;

        tracing::info!(device_id = %event.device_id, sync_event_id = stored.id, "sync event processed");
        Ok(stored)
    }

    /// Fetches one page of a device's history together with its stats.
    ///
    /// The two queries are independent reads and run concurrently. The
    /// pagination echo takes its total from the stats rollup.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn device_sync_history(
        &self,
        device_id: &str,
        filter: HistoryFilter,
    ) -> Result<SyncHistoryResponse, GatewayError> {
        let (sync_history, stats) = tokio::try_join!(
            self.events.by_device_id(device_id, &filter),
            self.events.device_stats(device_id),
        )?;

        Ok(SyncHistoryResponse {
            device_id: device_id.to_string(),
            pagination: PaginationMeta {
                limit: filter.limit,
                offset: filter.offset,
                total_events: stats.total_syncs,
            },
            stats,
            sync_history,
        })
    }

    /// Builds the repeated-failures report for the given threshold.
    ///
    /// Returns an empty device list (not an error) when no device meets
    /// the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn devices_with_repeated_failures(
        &self,
        threshold: i64,
    ) -> Result<RepeatedFailuresResponse, GatewayError> {
        let rows = self.devices.devices_with_repeated_failures(threshold).await?;
        Ok(RepeatedFailuresResponse::from_rows(threshold, rows))
    }

    /// Reduces the per-device bulk rollup into system-wide totals.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn system_stats(&self) -> Result<SystemStatsResponse, GatewayError> {
        let rows = self.events.bulk_stats(BULK_STATS_LIMIT).await?;
        Ok(SystemStatsResponse::from_bulk(rows))
    }
}
