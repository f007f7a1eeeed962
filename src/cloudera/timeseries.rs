//! Decoding of the Cloudera Manager `/timeseries` response.
//!
//! The document nests `items[].timeSeries[]`, each series carrying a metadata
//! block and a `data` array. Every field is optional on the wire; missing or
//! `null` fields decode as their empty default and data entries go through an explicit numeric
//! coercion that skips anything that is not a number.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::utils::error::{Result, TapperError};

/// Treat an explicit `null` like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeSeriesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<TimeSeriesItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_series: Vec<RawTimeSeries>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_series_query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTimeSeries {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: SeriesMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: SeriesAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rollup_used: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_id: String,
}

/// One decoded series: its metadata plus the samples that coerced to f64
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSamples {
    pub metadata: SeriesMetadata,
    pub values: Vec<f64>,
}

/// Coerce one `data` entry to a float.
///
/// Accepts `{"value": <number>}` objects, bare numbers and numeric strings.
pub fn sample_value(entry: &Value) -> Option<f64> {
    match entry {
        Value::Object(map) => map.get("value").and_then(scalar_value),
        other => scalar_value(other),
    }
}

fn scalar_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Decode a raw response body into per-series samples, in document order
pub fn parse(body: &[u8]) -> Result<Vec<SeriesSamples>> {
    let response: TimeSeriesResponse = serde_json::from_slice(body)
        .map_err(|e| TapperError::decode(format!("invalid time-series document: {}", e)))?;

    let mut series = Vec::new();
    for item in response.items {
        for raw in item.time_series {
            let values: Vec<f64> = raw.data.iter().filter_map(sample_value).collect();
            let skipped = raw.data.len() - values.len();
            if skipped > 0 {
                tracing::debug!(
                    "Skipped {} non-numeric samples for entity {}",
                    skipped,
                    raw.metadata.entity_name
                );
            }
            series.push(SeriesSamples {
                metadata: raw.metadata,
                values,
            });
        }
    }

    Ok(series)
}
