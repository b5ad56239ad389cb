use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::Display;
use uuid::Uuid;

/// Longest device identifier the `device_id` column accepts.
pub const DEVICE_ID_MAX_LEN: usize = 100;

/// Fractional digits kept by the `value` column (NUMERIC 10,3).
pub const VALUE_SCALE: u32 = 3;

/// Metric kinds stored in the unified `data_point_series` table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum SeriesType {
    Steps,
    HeartRate,
    Energy,
}

impl SeriesType {
    pub const ALL: [SeriesType; 3] = [
        SeriesType::Steps,
        SeriesType::HeartRate,
        SeriesType::Energy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesType::Steps => "steps",
            SeriesType::HeartRate => "heart_rate",
            SeriesType::Energy => "energy",
        }
    }

    /// Canonical display unit, mirroring the seeded `series_type_definition` rows.
    pub fn canonical_unit(&self) -> &'static str {
        match self {
            SeriesType::Steps => "count",
            SeriesType::HeartRate => "bpm",
            SeriesType::Energy => "kcal",
        }
    }
}

impl Display for SeriesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted measurement in the unified time series table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataPointSeries {
    pub id: Uuid,
    pub device_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub value: Decimal,
    pub series_type: SeriesType,
}

/// Generic create payload for data point series.
///
/// The typed service entry points force `series_type` to their own kind,
/// so any caller-supplied tag is ignored there.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesSampleCreate {
    #[serde(default)]
    pub device_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub value: Decimal,
    #[serde(default)]
    pub series_type: Option<SeriesType>,
}

impl TimeSeriesSampleCreate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(device_id) = &self.device_id {
            if device_id.is_empty() {
                return Err("device_id cannot be empty".into());
            }
            if device_id.chars().count() > DEVICE_ID_MAX_LEN {
                return Err(format!(
                    "device_id too long (maximum {} characters)",
                    DEVICE_ID_MAX_LEN
                ));
            }
        }

        if self.value.round_dp(VALUE_SCALE) != self.value {
            return Err(format!(
                "value {} has more than {} decimal places",
                self.value, VALUE_SCALE
            ));
        }
        if self.value.abs() >= Decimal::from(10_000_000_i64) {
            return Err(format!("value {} exceeds 7 integer digits", self.value));
        }

        Ok(())
    }
}

/// Response payload mirroring the create payload plus the assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSampleResponse {
    pub id: Uuid,
    pub device_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub value: Decimal,
    pub series_type: SeriesType,
}

impl From<DataPointSeries> for TimeSeriesSampleResponse {
    fn from(sample: DataPointSeries) -> Self {
        Self {
            id: sample.id,
            device_id: sample.device_id,
            recorded_at: sample.recorded_at,
            value: sample.value,
            series_type: sample.series_type,
        }
    }
}

/// Filters for retrieving time series samples. Bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeSeriesQueryParams {
    #[serde(default)]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: &str) -> TimeSeriesSampleCreate {
        TimeSeriesSampleCreate {
            device_id: Some("watch-1".to_string()),
            recorded_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            value: value.parse().unwrap(),
            series_type: None,
        }
    }

    #[test]
    fn accepts_value_at_full_precision() {
        assert!(payload("9999999.999").validate().is_ok());
    }

    #[test]
    fn rejects_value_with_too_many_decimal_places() {
        let result = payload("72.5001").validate();
        assert!(result.unwrap_err().contains("decimal places"));
    }

    #[test]
    fn rejects_value_exceeding_integer_digits() {
        assert!(payload("10000000.000").validate().is_err());
        assert!(payload("-10000000.000").validate().is_err());
    }

    #[test]
    fn rejects_overlong_device_id() {
        let mut sample = payload("72.500");
        sample.device_id = Some("x".repeat(DEVICE_ID_MAX_LEN + 1));
        assert!(sample.validate().unwrap_err().contains("too long"));
    }

    #[test]
    fn rejects_empty_device_id() {
        let mut sample = payload("72.500");
        sample.device_id = Some(String::new());
        assert!(sample.validate().is_err());
    }

    #[test]
    fn missing_device_id_is_valid_for_creation() {
        let mut sample = payload("72.500");
        sample.device_id = None;
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn create_payload_accepts_offset_timestamps() {
        let sample: TimeSeriesSampleCreate = serde_json::from_value(serde_json::json!({
            "recorded_at": "2024-01-01T02:00:00+02:00",
            "value": "72.500"
        }))
        .unwrap();
        assert_eq!(
            sample.recorded_at,
            "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(sample.device_id, None);
        assert_eq!(sample.series_type, None);
    }

    #[test]
    fn series_type_uses_snake_case_tags() {
        assert_eq!(
            serde_json::to_value(SeriesType::HeartRate).unwrap(),
            serde_json::json!("heart_rate")
        );
        let parsed: SeriesType = serde_json::from_value(serde_json::json!("steps")).unwrap();
        assert_eq!(parsed, SeriesType::Steps);
        for series_type in SeriesType::ALL {
            assert_eq!(series_type.to_string(), series_type.as_str());
        }
    }

    #[test]
    fn response_value_serializes_with_full_scale() {
        let response = TimeSeriesSampleResponse {
            id: Uuid::new_v4(),
            device_id: Some("watch-1".to_string()),
            recorded_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            value: "72.500".parse().unwrap(),
            series_type: SeriesType::HeartRate,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["value"], serde_json::json!("72.500"));
        assert_eq!(json["series_type"], serde_json::json!("heart_rate"));
    }
}
