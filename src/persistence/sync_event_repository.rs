//! Sync event storage and aggregation queries backed by `sqlx::PgPool`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{
    DeviceBulkStats, DeviceStats, HistoryFilter, NewSyncEvent, SyncEvent, success_rate,
};
use crate::error::GatewayError;

/// Row tuple shape shared by every `SELECT *`-equivalent event query.
type SyncEventRow = (
    i64,
    String,
    DateTime<Utc>,
    i64,
    i64,
    Option<f64>,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Stateless accessor for the `sync_events` table.
#[derive(Debug, Clone)]
pub struct SyncEventRepository {
    pool: PgPool,
}

impl SyncEventRepository {
    /// Creates a new repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one sync event and returns the persisted row.
    ///
    /// The caller must ensure the device row exists first; the foreign
    /// key rejects events for unknown devices.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on constraint violation or
    /// database failure.
    pub async fn create(&self, event: &NewSyncEvent) -> Result<SyncEvent, GatewayError> {
        let row = sqlx::query_as::<_, SyncEventRow>(
            "INSERT INTO sync_events \
                 (device_id, timestamp, total_files_synced, total_errors, internet_speed) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, device_id, timestamp, total_files_synced, total_errors, \
                       internet_speed, created_at, updated_at",
        )
        .bind(&event.device_id)
        .bind(event.timestamp)
        .bind(event.total_files_synced)
        .bind(event.total_errors)
        .bind(event.internet_speed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(device_id = %event.device_id, error = %e, "failed to insert sync event");
            GatewayError::Persistence(e.to_string())
        })?;

        tracing::info!(device_id = %event.device_id, "sync event created");
        Ok(event_from_row(row))
    }

    /// Returns one page of a device's events, `timestamp` descending,
    /// optionally bounded to an inclusive date range.
    ///
    /// With `start_date == end_date` only events at exactly that instant
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn by_device_id(
        &self,
        device_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<SyncEvent>, GatewayError> {
        let rows = sqlx::query_as::<_, SyncEventRow>(
            "SELECT id, device_id, timestamp, total_files_synced, total_errors, \
                    internet_speed, created_at, updated_at \
             FROM sync_events \
             WHERE device_id = $1 \
               AND ($2::timestamptz IS NULL OR timestamp >= $2) \
               AND ($3::timestamptz IS NULL OR timestamp <= $3) \
             ORDER BY timestamp DESC \
             LIMIT $4 OFFSET $5",
        )
        .bind(device_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(device_id, error = %e, "failed to fetch sync events");
            GatewayError::Persistence(e.to_string())
        })?;

        Ok(rows.into_iter().map(event_from_row).collect())
    }

    /// Computes the single-pass aggregate rollup for one device.
    ///
    /// An unknown or empty device yields a zeroed rollup with
    /// `success_rate = 0.0`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn device_stats(&self, device_id: &str) -> Result<DeviceStats, GatewayError> {
        let row = sqlx::query_as::<
            _,
            (
                i64,
                i64,
                i64,
                Option<f64>,
                Option<DateTime<Utc>>,
                Option<DateTime<Utc>>,
                i64,
                i64,
            ),
        >(
            "SELECT COUNT(*), \
                    COALESCE(SUM(total_files_synced), 0)::BIGINT, \
                    COALESCE(SUM(total_errors), 0)::BIGINT, \
                    AVG(internet_speed), \
                    MAX(timestamp), \
                    MIN(timestamp), \
                    COUNT(*) FILTER (WHERE total_errors > 0), \
                    COUNT(*) FILTER (WHERE total_errors = 0) \
             FROM sync_events WHERE device_id = $1",
        )
        .bind(device_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(device_id, error = %e, "failed to compute device stats");
            GatewayError::Persistence(e.to_string())
        })?;

        let (
            total_syncs,
            total_files_synced,
            total_errors,
            avg_internet_speed,
            last_sync,
            first_sync,
            failed_syncs,
            successful_syncs,
        ) = row;

        Ok(DeviceStats {
            total_syncs,
            total_files_synced,
            total_errors,
            avg_internet_speed,
            last_sync,
            first_sync,
            failed_syncs,
            successful_syncs,
            success_rate: success_rate(successful_syncs, total_syncs),
        })
    }

    /// Returns one aggregate row per device (no average speed), ordered
    /// by each device's most recent event timestamp descending, capped
    /// at `limit` devices.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn bulk_stats(&self, limit: i64) -> Result<Vec<DeviceBulkStats>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (String, i64, i64, i64, DateTime<Utc>, DateTime<Utc>, i64, i64),
        >(
            "SELECT device_id, \
                    COUNT(*), \
                    COALESCE(SUM(total_files_synced), 0)::BIGINT, \
                    COALESCE(SUM(total_errors), 0)::BIGINT, \
                    MAX(timestamp) AS last_sync, \
                    MIN(timestamp), \
                    COUNT(*) FILTER (WHERE total_errors > 0), \
                    COUNT(*) FILTER (WHERE total_errors = 0) \
             FROM sync_events \
             GROUP BY device_id \
             ORDER BY last_sync DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to compute bulk stats");
            GatewayError::Persistence(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    device_id,
                    total_syncs,
                    total_files_synced,
                    total_errors,
                    last_sync,
                    first_sync,
                    failed_syncs,
                    successful_syncs,
                )| {
                    DeviceBulkStats {
                        device_id,
                        total_syncs,
                        total_files_synced,
                        total_errors,
                        last_sync,
                        first_sync,
                        failed_syncs,
                        successful_syncs,
                        success_rate: success_rate(successful_syncs, total_syncs),
                    }
                },
            )
            .collect())
    }
}

fn event_from_row(row: SyncEventRow) -> SyncEvent {
    let (
        id,
        device_id,
        timestamp,
        total_files_synced,
        total_errors,
        internet_speed,
        created_at,
        updated_at,
    ) = row;
    SyncEvent {
        id,
        device_id,
        timestamp,
        total_files_synced,
        total_errors,
        internet_speed,
        created_at,
        updated_at,
    }
}
