//! Core domain types used across the telemetry pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Category of a simulated sensor. Doubles as the measurement name in the
/// time-series store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Electricity,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Electricity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Electricity => "electricity",
        }
    }

    /// Unit of measurement reported for this sensor category
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Electricity => "kW",
        }
    }

    /// Measurement name under which the external rollup job stores
    /// time-bucketed aggregates of this category
    pub fn aggregated_measurement(&self) -> String {
        format!("{}_aggregated", self.as_str())
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "temperature" => Some(Self::Temperature),
            "humidity" => Some(Self::Humidity),
            "electricity" => Some(Self::Electricity),
            _ => None,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped sensor measurement, as carried on the bus.
///
/// The canonical wire shape is camelCase; `alias` attributes accept the
/// snake_case payloads emitted by older producers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "sensorId", alias = "sensor_id")]
    pub sensor_id: String,
    #[serde(rename = "sensorType", alias = "sensor_type")]
    pub sensor_type: SensorType,
    pub location: String,
    pub value: f64,
    /// Not all historical producers carried a unit; ingestion does not
    /// require one.
    #[serde(default)]
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Immutable per-agent configuration, created once at process start from the
/// static fleet definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub location: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub publish_interval_secs: u64,
}

impl SensorDescriptor {
    pub fn new(
        sensor_id: impl Into<String>,
        sensor_type: SensorType,
        location: impl Into<String>,
        min: f64,
        max: f64,
        publish_interval_secs: u64,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            sensor_type,
            location: location.into(),
            unit: sensor_type.unit().to_string(),
            min,
            max,
            publish_interval_secs,
        }
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publish_interval_secs)
    }
}

/// A time-bucketed rollup of readings, produced by the external rollup job
/// and read back by the historian. Statistics the rollup omitted for a
/// bucket are reported as 0.0 rather than dropping the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReading {
    #[serde(rename = "sensorId")]
    pub sensor_id: String,
    #[serde(rename = "sensorType")]
    pub sensor_type: SensorType,
    pub location: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Discovery view: one location with the number of distinct sensors that
/// have recorded at least one point there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    #[serde(rename = "sensorCount")]
    pub sensor_count: u64,
}

/// Discovery view: one sensor identity observed in the recent window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorInfo {
    #[serde(rename = "sensorId")]
    pub sensor_id: String,
    #[serde(rename = "sensorType")]
    pub sensor_type: String,
    pub location: String,
}
