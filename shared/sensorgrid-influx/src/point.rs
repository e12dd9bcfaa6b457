//! Line Protocol point construction
//!
//! One `DataPoint` renders to one InfluxDB v2 Line Protocol line:
//! `measurement,tag=v field=value <ns-timestamp>`. Duplicate writes for the
//! same (series, timestamp) are passed through as-is; the store's own
//! last-write-wins behavior applies.

use chrono::{DateTime, Utc};
use sensorgrid_core::Reading;

/// One point to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, f64)>,
    timestamp: DateTime<Utc>,
}

impl DataPoint {
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    /// The canonical Stored Point shape for a Reading: measurement is the
    /// sensor type, sensorId and location are indexed tags, value is the
    /// single numeric field.
    pub fn from_reading(reading: &Reading) -> Self {
        Self::new(reading.sensor_type.as_str(), reading.timestamp)
            .tag("sensorId", &reading.sensor_id)
            .tag("location", &reading.location)
            .field("value", reading.value)
    }

    /// Render as one Line Protocol line, nanosecond precision.
    /// Tags are written in lexicographic key order.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        let mut tags: Vec<_> = self.tags.iter().collect();
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in tags {
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&escape_tag(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&format_float(*value));
        }

        line.push(' ');
        line.push_str(&self.timestamp.timestamp_nanos_opt().unwrap_or_default().to_string());
        line
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

fn format_float(v: f64) -> String {
    // Line protocol has no NaN/inf representation
    if v.is_finite() {
        v.to_string()
    } else {
        "0".to_string()
    }
}
