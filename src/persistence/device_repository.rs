//! Device registry operations backed by `sqlx::PgPool`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{Device, FailingDevice};
use crate::error::GatewayError;

/// Stateless accessor for the `devices` table.
///
/// Holds only the shared connection pool; safe to clone into handlers.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the device row for `device_id`, inserting it first if absent.
    ///
    /// Concurrent first-contact from the same device is resolved by the
    /// uniqueness constraint: the insert is `ON CONFLICT DO NOTHING`, and
    /// a losing racer falls through to the fetch.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn find_or_create(&self, device_id: &str) -> Result<Device, GatewayError> {
        let inserted = sqlx::query_as::<_, (i64, String, DateTime<Utc>, DateTime<Utc>)>(
            "INSERT INTO devices (device_id) VALUES ($1) \
             ON CONFLICT (device_id) DO NOTHING \
             RETURNING id, device_id, created_at, updated_at",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(device_id, error = %e, "failed to insert device");
            GatewayError::Persistence(e.to_string())
        })?;

        if let Some(row) = inserted {
            tracing::info!(device_id, "new device registered");
            return Ok(device_from_row(row));
        }

        let row = sqlx::query_as::<_, (i64, String, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id, device_id, created_at, updated_at FROM devices WHERE device_id = $1",
        )
        .bind(device_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(device_id, error = %e, "failed to fetch device");
            GatewayError::Persistence(e.to_string())
        })?;

        Ok(device_from_row(row))
    }

    /// Refreshes the device's `updated_at` to the current server time.
    ///
    /// A no-op (not an error) when the id does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn update_last_seen(&self, device_id: &str) -> Result<(), GatewayError> {
        sqlx::query("UPDATE devices SET updated_at = CURRENT_TIMESTAMP WHERE device_id = $1")
            .bind(device_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(device_id, error = %e, "failed to update device last seen");
                GatewayError::Persistence(e.to_string())
            })?;

        Ok(())
    }

    /// Returns devices having at least `threshold` sync events with
    /// `total_errors > 0`, annotated with failure count and most recent
    /// failure time. Ordered by failure count desc, then last failure desc.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on database failure.
    pub async fn devices_with_repeated_failures(
        &self,
        threshold: i64,
    ) -> Result<Vec<FailingDevice>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (String, DateTime<Utc>, DateTime<Utc>, i64, DateTime<Utc>),
        >(
            "SELECT d.device_id, d.created_at, d.updated_at, \
                    COUNT(se.id) AS total_failed_syncs, \
                    MAX(se.timestamp) AS last_failed_sync \
             FROM devices d \
             INNER JOIN sync_events se ON d.device_id = se.device_id \
             WHERE se.total_errors > 0 \
             GROUP BY d.device_id, d.created_at, d.updated_at \
             HAVING COUNT(se.id) >= $1 \
             ORDER BY total_failed_syncs DESC, last_failed_sync DESC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(threshold, error = %e, "failed to query repeated failures");
            GatewayError::Persistence(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(
                |(device_id, created_at, updated_at, total_failed_syncs, last_failed_sync)| {
                    FailingDevice {
                        device_id,
                        created_at,
                        updated_at,
                        total_failed_syncs,
                        last_failed_sync,
                    }
                },
            )
            .collect())
    }
}

fn device_from_row(row: (i64, String, DateTime<Utc>, DateTime<Utc>)) -> Device {
    let (id, device_id, created_at, updated_at) = row;
    Device {
        id,
        device_id,
        created_at,
        updated_at,
    }
}
