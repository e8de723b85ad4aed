//! Database models for devices and sync events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A device row from the `devices` table.
///
/// A device row exists iff at least one sync event has ever been accepted
/// for that `device_id` — rows are created lazily on first contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Auto-increment row ID.
    pub id: i64,
    /// Client-supplied unique device identifier.
    pub device_id: String,
    /// Set once on first sight.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every accepted sync event ("last seen").
    pub updated_at: DateTime<Utc>,
}

/// A sync event row from the `sync_events` table.
///
/// Created once per ingested report, never updated or deleted by normal
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Server-assigned surrogate key, monotonically increasing.
    pub id: i64,
    /// Owning device.
    pub device_id: String,
    /// Client-supplied event time (never in the future at ingest).
    pub timestamp: DateTime<Utc>,
    /// Number of files synced in this attempt.
    pub total_files_synced: i64,
    /// Number of errors; zero means a successful sync.
    pub total_errors: i64,
    /// Measured link speed in Mbps, when reported.
    pub internet_speed: Option<f64>,
    /// Server receipt timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Trigger-maintained row update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting one sync event.
#[derive(Debug, Clone)]
pub struct NewSyncEvent {
    /// Reporting device identifier (1–255 characters).
    pub device_id: String,
    /// Client-supplied event time, already checked against server now.
    pub timestamp: DateTime<Utc>,
    /// Non-negative file count.
    pub total_files_synced: i64,
    /// Non-negative error count.
    pub total_errors: i64,
    /// Optional non-negative link speed in Mbps.
    pub internet_speed: Option<f64>,
}

/// Validated pagination and date-range filter for history queries.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    /// Page size, bounded to [1, 1000].
    pub limit: i64,
    /// Rows to skip, non-negative.
    pub offset: i64,
    /// Inclusive lower bound on event `timestamp`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on event `timestamp`.
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            start_date: None,
            end_date: None,
        }
    }
}

/// Aggregate rollup over all of one device's sync events.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStats {
    /// Total number of sync events recorded for the device.
    pub total_syncs: i64,
    /// Sum of files synced across all events.
    pub total_files_synced: i64,
    /// Sum of errors across all events.
    pub total_errors: i64,
    /// Mean reported link speed, ignoring events without one.
    pub avg_internet_speed: Option<f64>,
    /// Most recent event timestamp.
    pub last_sync: Option<DateTime<Utc>>,
    /// Earliest event timestamp.
    pub first_sync: Option<DateTime<Utc>>,
    /// Events with at least one error.
    pub failed_syncs: i64,
    /// Events with zero errors.
    pub successful_syncs: i64,
    /// `100 × successful / total`, rounded to two decimals; `0.0` when
    /// the device has no events.
    pub success_rate: f64,
}

/// Per-device aggregate row from the bulk rollup (no average speed).
#[derive(Debug, Clone, Serialize)]
pub struct DeviceBulkStats {
    /// Device identifier.
    pub device_id: String,
    /// Total number of sync events for the device.
    pub total_syncs: i64,
    /// Sum of files synced.
    pub total_files_synced: i64,
    /// Sum of errors.
    pub total_errors: i64,
    /// Most recent event timestamp.
    pub last_sync: DateTime<Utc>,
    /// Earliest event timestamp.
    pub first_sync: DateTime<Utc>,
    /// Events with at least one error.
    pub failed_syncs: i64,
    /// Events with zero errors.
    pub successful_syncs: i64,
    /// Zero-safe success percentage, rounded to two decimals.
    pub success_rate: f64,
}

/// A device matching the repeated-failure threshold, with failure
/// annotations from the aggregation query.
#[derive(Debug, Clone, Serialize)]
pub struct FailingDevice {
    /// Device identifier.
    pub device_id: String,
    /// Device registration time.
    pub created_at: DateTime<Utc>,
    /// Device last-seen time.
    pub updated_at: DateTime<Utc>,
    /// Count of events with `total_errors > 0`.
    pub total_failed_syncs: i64,
    /// Most recent failing event timestamp.
    pub last_failed_sync: DateTime<Utc>,
}

/// Computes `100 × successful / total` rounded to two decimals.
///
/// Returns `0.0` (not NaN) when `total` is zero.
#[must_use]
pub fn success_rate(successful: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = successful as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_zero_for_empty_device() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn success_rate_half_failed() {
        assert_eq!(success_rate(1, 2), 50.0);
    }

    #[test]
    fn success_rate_rounds_to_two_decimals() {
        // 2/3 = 66.666..% -> 66.67
        assert_eq!(success_rate(2, 3), 66.67);
        // 1/3 = 33.333..% -> 33.33
        assert_eq!(success_rate(1, 3), 33.33);
    }

    #[test]
    fn success_rate_all_successful() {
        assert_eq!(success_rate(5, 5), 100.0);
    }
}
