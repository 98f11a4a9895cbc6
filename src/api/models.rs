use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::view::Metric;

/// Identifier of a station, stable across fetches.
pub type StationId = i64;

/// Latest known readings of one station, as returned by
/// `/stations/public` and `/stations/all`.
///
/// Every field except `station_id` is decoded leniently: a missing or
/// wrongly-typed value becomes `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StationSnapshot {
    #[serde(deserialize_with = "station_id")]
    pub station_id: StationId,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_raining: Option<bool>,
    /// Timestamp of the last upload; `None` when the station never reported.
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_updated: Option<String>,

    // First-paint only
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_access_key: Option<String>,
}

impl StationSnapshot {
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::WindSpeed => self.wind_speed,
        }
    }
}

/// One historical record from `/stations/{id}/latest_metrics` (newest first).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reading {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub uv_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wind_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_raining: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

impl Reading {
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::WindSpeed => self.wind_speed,
        }
    }
}

/// Response from `/stations/{id}/details`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StationDetail {
    #[serde(flatten)]
    pub snapshot: StationSnapshot,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wind_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub uv_index: Option<f64>,
}

/// Decode a JSON array record by record.
///
/// The body itself must be an array. Elements that cannot be decoded are
/// logged and dropped so one bad record never hides the others.
///
/// # Errors
///
/// Returns `AppError::Decode` if the body is not a JSON array.
pub fn decode_records<T: DeserializeOwned>(body: Value, endpoint: &str) -> AppResult<Vec<T>> {
    let Value::Array(items) = body else {
        return Err(AppError::Decode(format!(
            "{endpoint}: expected a JSON array"
        )));
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(endpoint, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            endpoint,
            decoded = records.len(),
            total,
            "Decoded partial response"
        );
    }

    Ok(records)
}

/// Station ids arrive as numbers, occasionally as numeric strings.
fn station_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StationId, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("station_id {n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("station_id {s:?} is not an integer"))),
        other => Err(D::Error::custom(format!(
            "station_id has unexpected type: {other}"
        ))),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite()))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
