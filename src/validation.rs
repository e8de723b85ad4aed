//! Request input validation.
//!
//! Each endpoint deserializes into a loose input struct (all fields
//! optional) and runs it through a validation function that returns
//! either the fully-typed value or a list of [`FieldError`]s, one per
//! offending field. Validation failures never reach the data layer.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::FieldError;
use crate::persistence::models::{HistoryFilter, NewSyncEvent};

/// Maximum length of a client-supplied device identifier.
pub const DEVICE_ID_MAX_LEN: usize = 255;

/// Largest accepted history page size.
pub const HISTORY_LIMIT_MAX: i64 = 1000;

/// Largest accepted repeated-failure threshold.
pub const THRESHOLD_MAX: i64 = 100;

/// Default repeated-failure threshold.
pub const THRESHOLD_DEFAULT: i64 = 3;

/// Raw `POST /api/sync-event` body before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncEventInput {
    /// Reporting device identifier.
    pub device_id: Option<String>,
    /// Event time as an ISO-8601 string.
    pub timestamp: Option<String>,
    /// Files synced in this attempt.
    pub total_files_synced: Option<i64>,
    /// Errors in this attempt.
    pub total_errors: Option<i64>,
    /// Link speed in Mbps; may be null or absent.
    pub internet_speed: Option<f64>,
}

/// Raw history query parameters before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Page size, defaults to 50.
    pub limit: Option<i64>,
    /// Rows to skip, defaults to 0.
    pub offset: Option<i64>,
    /// Inclusive range start as an ISO-8601 string.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// Inclusive range end as an ISO-8601 string.
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Raw repeated-failures query parameters before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdQuery {
    /// Minimum number of failed syncs, defaults to 3.
    pub threshold: Option<i64>,
}

/// Validates a sync event body against `now` (server receipt time).
///
/// # Errors
///
/// Returns one [`FieldError`] per violation: missing required field,
/// out-of-range count, malformed or future timestamp, negative speed.
pub fn validate_sync_event(
    input: &SyncEventInput,
    now: DateTime<Utc>,
) -> Result<NewSyncEvent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let device_id = match input.device_id.as_deref() {
        None => {
            errors.push(FieldError::new(
                "device_id",
                "device_id is required",
                serde_json::Value::Null,
            ));
            None
        }
        Some("") => {
            errors.push(FieldError::new(
                "device_id",
                "device_id must not be empty",
                json!(""),
            ));
            None
        }
        Some(id) if id.len() > DEVICE_ID_MAX_LEN => {
            errors.push(FieldError::new(
                "device_id",
                format!("device_id must be at most {DEVICE_ID_MAX_LEN} characters"),
                json!(id),
            ));
            None
        }
        Some(id) => Some(id.to_string()),
    };

    let timestamp = match input.timestamp.as_deref() {
        None => {
            errors.push(FieldError::new(
                "timestamp",
                "timestamp is required",
                serde_json::Value::Null,
            ));
            None
        }
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Err(_) => {
                errors.push(FieldError::new(
                    "timestamp",
                    "timestamp must be a valid ISO-8601 date",
                    json!(raw),
                ));
                None
            }
            Ok(parsed) => {
                let parsed = parsed.with_timezone(&Utc);
                if parsed > now {
                    errors.push(FieldError::new(
                        "timestamp",
                        "timestamp must not be in the future",
                        json!(raw),
                    ));
                    None
                } else {
                    Some(parsed)
                }
            }
        },
    };

    let total_files_synced = validate_count(&mut errors, "total_files_synced", input.total_files_synced);
    let total_errors = validate_count(&mut errors, "total_errors", input.total_errors);

    if let Some(speed) = input.internet_speed {
        if speed < 0.0 || !speed.is_finite() {
            errors.push(FieldError::new(
                "internet_speed",
                "internet_speed must be a non-negative number",
                json!(speed),
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match (device_id, timestamp, total_files_synced, total_errors) {
        (Some(device_id), Some(timestamp), Some(total_files_synced), Some(total_errors)) => {
            Ok(NewSyncEvent {
                device_id,
                timestamp,
                total_files_synced,
                total_errors,
                internet_speed: input.internet_speed,
            })
        }
        // Unreachable: every None above pushed an error.
        _ => Err(vec![FieldError::new(
            "body",
            "invalid sync event",
            serde_json::Value::Null,
        )]),
    }
}

/// Validates a device path identifier (1–255 characters).
///
/// # Errors
///
/// Returns one [`FieldError`] when the id is empty or too long.
pub fn validate_device_id(id: &str) -> Result<(), Vec<FieldError>> {
    if id.is_empty() {
        return Err(vec![FieldError::new(
            "id",
            "device id must not be empty",
            json!(id),
        )]);
    }
    if id.len() > DEVICE_ID_MAX_LEN {
        return Err(vec![FieldError::new(
            "id",
            format!("device id must be at most {DEVICE_ID_MAX_LEN} characters"),
            json!(id),
        )]);
    }
    Ok(())
}

/// Validates history pagination and date-range parameters.
///
/// # Errors
///
/// Returns one [`FieldError`] per out-of-range or malformed parameter.
pub fn validate_history_query(query: &HistoryQuery) -> Result<HistoryFilter, Vec<FieldError>> {
    let mut errors = Vec::new();
    let defaults = HistoryFilter::default();

    let limit = query.limit.unwrap_or(defaults.limit);
    if !(1..=HISTORY_LIMIT_MAX).contains(&limit) {
        errors.push(FieldError::new(
            "limit",
            format!("limit must be between 1 and {HISTORY_LIMIT_MAX}"),
            json!(limit),
        ));
    }

    let offset = query.offset.unwrap_or(defaults.offset);
    if offset < 0 {
        errors.push(FieldError::new(
            "offset",
            "offset must be non-negative",
            json!(offset),
        ));
    }

    let start_date = parse_optional_date(&mut errors, "startDate", query.start_date.as_deref());
    let end_date = parse_optional_date(&mut errors, "endDate", query.end_date.as_deref());

    if errors.is_empty() {
        Ok(HistoryFilter {
            limit,
            offset,
            start_date,
            end_date,
        })
    } else {
        Err(errors)
    }
}

/// Validates the repeated-failures threshold (1–100, default 3).
///
/// # Errors
///
/// Returns one [`FieldError`] when the threshold is out of range.
pub fn validate_threshold(query: &ThresholdQuery) -> Result<i64, Vec<FieldError>> {
    let threshold = query.threshold.unwrap_or(THRESHOLD_DEFAULT);
    if !(1..=THRESHOLD_MAX).contains(&threshold) {
        return Err(vec![FieldError::new(
            "threshold",
            format!("threshold must be between 1 and {THRESHOLD_MAX}"),
            json!(threshold),
        )]);
    }
    Ok(threshold)
}

fn validate_count(errors: &mut Vec<FieldError>, field: &str, value: Option<i64>) -> Option<i64> {
    match value {
        None => {
            errors.push(FieldError::new(
                field,
                format!("{field} is required"),
                serde_json::Value::Null,
            ));
            None
        }
        Some(n) if n < 0 => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be a non-negative integer"),
                json!(n),
            ));
            None
        }
        Some(n) => Some(n),
    }
}

fn parse_optional_date(
    errors: &mut Vec<FieldError>,
    field: &str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be a valid ISO-8601 date"),
                json!(raw),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap_or_default()
    }

    fn valid_input() -> SyncEventInput {
        SyncEventInput {
            device_id: Some("PI-1".to_string()),
            timestamp: Some("2024-01-01T00:00:00Z".to_string()),
            total_files_synced: Some(10),
            total_errors: Some(0),
            internet_speed: Some(42.5),
        }
    }

    #[test]
    fn accepts_valid_event() {
        let result = validate_sync_event(&valid_input(), now());
        let Ok(event) = result else {
            unreachable!("valid input must pass");
        };
        assert_eq!(event.device_id, "PI-1");
        assert_eq!(event.total_files_synced, 10);
        assert_eq!(event.internet_speed, Some(42.5));
    }

    #[test]
    fn accepts_null_internet_speed() {
        let mut input = valid_input();
        input.internet_speed = None;
        assert!(validate_sync_event(&input, now()).is_ok());
    }

    #[test]
    fn rejects_future_timestamp() {
        let mut input = valid_input();
        input.timestamp = Some("2030-01-01T00:00:00Z".to_string());
        let Err(errors) = validate_sync_event(&input, now()) else {
            unreachable!("future timestamp must fail");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|e| e.field.as_str()), Some("timestamp"));
    }

    #[test]
    fn accepts_timestamp_equal_to_now() {
        let mut input = valid_input();
        input.timestamp = Some("2024-06-01T12:00:00Z".to_string());
        assert!(validate_sync_event(&input, now()).is_ok());
    }

    #[test]
    fn collects_all_field_errors() {
        let input = SyncEventInput {
            device_id: None,
            timestamp: Some("not-a-date".to_string()),
            total_files_synced: Some(-1),
            total_errors: None,
            internet_speed: Some(-3.0),
        };
        let Err(errors) = validate_sync_event(&input, now()) else {
            unreachable!("invalid input must fail");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "device_id",
                "timestamp",
                "total_files_synced",
                "total_errors",
                "internet_speed"
            ]
        );
    }

    #[test]
    fn rejects_oversized_device_id() {
        let mut input = valid_input();
        input.device_id = Some("x".repeat(256));
        assert!(validate_sync_event(&input, now()).is_err());
        assert!(validate_device_id(&"x".repeat(256)).is_err());
        assert!(validate_device_id(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn history_defaults_applied() {
        let result = validate_history_query(&HistoryQuery::default());
        let Ok(filter) = result else {
            unreachable!("empty query must pass");
        };
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(filter.start_date.is_none());
        assert!(filter.end_date.is_none());
    }

    #[test]
    fn history_limit_bounds() {
        let query = HistoryQuery {
            limit: Some(0),
            ..HistoryQuery::default()
        };
        assert!(validate_history_query(&query).is_err());

        let query = HistoryQuery {
            limit: Some(1001),
            ..HistoryQuery::default()
        };
        assert!(validate_history_query(&query).is_err());

        let query = HistoryQuery {
            limit: Some(1000),
            offset: Some(0),
            ..HistoryQuery::default()
        };
        assert!(validate_history_query(&query).is_ok());
    }

    #[test]
    fn history_rejects_negative_offset() {
        let query = HistoryQuery {
            offset: Some(-1),
            ..HistoryQuery::default()
        };
        let Err(errors) = validate_history_query(&query) else {
            unreachable!("negative offset must fail");
        };
        assert_eq!(errors.first().map(|e| e.field.as_str()), Some("offset"));
    }

    #[test]
    fn history_parses_date_range() {
        let query = HistoryQuery {
            start_date: Some("2024-01-01T00:00:00Z".to_string()),
            end_date: Some("2024-02-01T00:00:00Z".to_string()),
            ..HistoryQuery::default()
        };
        let Ok(filter) = validate_history_query(&query) else {
            unreachable!("valid range must pass");
        };
        assert!(filter.start_date.is_some());
        assert!(filter.end_date.is_some());
    }

    #[test]
    fn history_rejects_malformed_dates() {
        let query = HistoryQuery {
            start_date: Some("yesterday".to_string()),
            ..HistoryQuery::default()
        };
        let Err(errors) = validate_history_query(&query) else {
            unreachable!("malformed date must fail");
        };
        assert_eq!(errors.first().map(|e| e.field.as_str()), Some("startDate"));
    }

    #[test]
    fn threshold_defaults_to_three() {
        assert_eq!(validate_threshold(&ThresholdQuery::default()), Ok(3));
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(&ThresholdQuery { threshold: Some(0) }).is_err());
        assert!(validate_threshold(&ThresholdQuery { threshold: Some(101) }).is_err());
        assert_eq!(
            validate_threshold(&ThresholdQuery {
                threshold: Some(100)
            }),
            Ok(100)
        );
    }
}
