//! Failure report and system rollup DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::persistence::models::{DeviceBulkStats, FailingDevice, success_rate};

/// Number of bulk rows echoed back as the recent-device sample.
const RECENT_DEVICES_SAMPLE: usize = 10;

/// One device entry in the repeated-failures report.
#[derive(Debug, Clone, Serialize)]
pub struct FailingDeviceDto {
    /// Device identifier.
    pub device_id: String,
    /// Count of events with errors.
    pub total_failed_syncs: i64,
    /// Most recent failing event timestamp.
    pub last_failed_sync: DateTime<Utc>,
    /// When the device was first seen.
    pub device_registered: DateTime<Utc>,
    /// When the device last reported.
    pub last_seen: DateTime<Utc>,
}

impl From<FailingDevice> for FailingDeviceDto {
    fn from(device: FailingDevice) -> Self {
        Self {
            device_id: device.device_id,
            total_failed_syncs: device.total_failed_syncs,
            last_failed_sync: device.last_failed_sync,
            device_registered: device.created_at,
            last_seen: device.updated_at,
        }
    }
}

/// Payload for `GET /api/devices/repeated-failures`.
#[derive(Debug, Clone, Serialize)]
pub struct RepeatedFailuresResponse {
    /// Threshold the report was computed against.
    pub threshold: i64,
    /// Number of devices meeting the threshold.
    pub total_devices: i64,
    /// Matching devices, worst first.
    pub devices: Vec<FailingDeviceDto>,
}

impl RepeatedFailuresResponse {
    /// Reshapes repository rows into the response envelope. An empty
    /// input produces an empty report, not an error.
    #[must_use]
    pub fn from_rows(threshold: i64, rows: Vec<FailingDevice>) -> Self {
        let devices: Vec<FailingDeviceDto> = rows.into_iter().map(Into::into).collect();
        Self {
            threshold,
            total_devices: devices.len() as i64,
            devices,
        }
    }
}

/// Payload for `GET /api/stats`: process-wide totals reduced from the
/// per-device bulk rollup.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatsResponse {
    /// Devices with at least one recorded event.
    pub total_devices: i64,
    /// Sync events across all devices.
    pub total_sync_events: i64,
    /// Failed syncs across all devices.
    pub total_failures: i64,
    /// Files synced across all devices.
    pub total_files_synced: i64,
    /// Zero-safe overall success percentage, rounded to two decimals.
    pub overall_success_rate: f64,
    /// First ten bulk rows, already ordered by recency.
    pub recent_devices: Vec<DeviceBulkStats>,
}

impl SystemStatsResponse {
    /// Reduces per-device bulk rows into system-wide totals.
    #[must_use]
    pub fn from_bulk(mut rows: Vec<DeviceBulkStats>) -> Self {
        let total_devices = rows.len() as i64;
        let total_sync_events: i64 = rows.iter().map(|d| d.total_syncs).sum();
        let total_failures: i64 = rows.iter().map(|d| d.failed_syncs).sum();
        let total_files_synced: i64 = rows.iter().map(|d| d.total_files_synced).sum();

        rows.truncate(RECENT_DEVICES_SAMPLE);

        Self {
            total_devices,
            total_sync_events,
            total_failures,
            total_files_synced,
            overall_success_rate: success_rate(total_sync_events - total_failures, total_sync_events),
            recent_devices: rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bulk_row(device_id: &str, total_syncs: i64, failed_syncs: i64, files: i64) -> DeviceBulkStats {
        let ts = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        DeviceBulkStats {
            device_id: device_id.to_string(),
            total_syncs,
            total_files_synced: files,
            total_errors: failed_syncs,
            last_sync: ts,
            first_sync: ts,
            failed_syncs,
            successful_syncs: total_syncs - failed_syncs,
            success_rate: success_rate(total_syncs - failed_syncs, total_syncs),
        }
    }

    #[test]
    fn system_stats_reduction() {
        // Two devices: (2 syncs, 0 failures) and (3 syncs, 2 failures).
        let rows = vec![bulk_row("a", 2, 0, 20), bulk_row("b", 3, 2, 5)];
        let stats = SystemStatsResponse::from_bulk(rows);

        assert_eq!(stats.total_devices, 2);
        assert_eq!(stats.total_sync_events, 5);
        assert_eq!(stats.total_failures, 2);
        assert_eq!(stats.total_files_synced, 25);
        assert_eq!(stats.overall_success_rate, 60.0);
    }

    #[test]
    fn system_stats_zero_safe() {
        let stats = SystemStatsResponse::from_bulk(vec![]);
        assert_eq!(stats.total_devices, 0);
        assert_eq!(stats.total_sync_events, 0);
        assert_eq!(stats.overall_success_rate, 0.0);
        assert!(stats.recent_devices.is_empty());
    }

    #[test]
    fn recent_devices_capped_at_ten() {
        let rows: Vec<DeviceBulkStats> = (0..15)
            .map(|i| bulk_row(&format!("dev-{i}"), 1, 0, 1))
            .collect();
        let stats = SystemStatsResponse::from_bulk(rows);
        assert_eq!(stats.total_devices, 15);
        assert_eq!(stats.recent_devices.len(), 10);
    }

    #[test]
    fn empty_failure_report() {
        let report = RepeatedFailuresResponse::from_rows(3, vec![]);
        assert_eq!(report.threshold, 3);
        assert_eq!(report.total_devices, 0);
        assert!(report.devices.is_empty());
    }

    #[test]
    fn failure_report_renames_device_fields() {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let rows = vec![FailingDevice {
            device_id: "PI-9".to_string(),
            created_at: ts,
            updated_at: ts,
            total_failed_syncs: 4,
            last_failed_sync: ts,
        }];
        let report = RepeatedFailuresResponse::from_rows(3, rows);
        assert_eq!(report.total_devices, 1);
        let Some(first) = report.devices.first() else {
            unreachable!("one device expected");
        };
        assert_eq!(first.device_id, "PI-9");
        assert_eq!(first.total_failed_syncs, 4);
        assert_eq!(first.device_registered, ts);
        assert_eq!(first.last_seen, ts);
    }
}
