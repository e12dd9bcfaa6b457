//! Read operations over the time-series store
//!
//! All public operations are stateless reads. Any store or decode failure is
//! caught here and degrades to an empty result; callers cannot distinguish
//! "no data" from "query failed" at this layer.

use chrono::{Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, warn};

use sensorgrid_core::{AggregatedReading, LocationInfo, Reading, SensorInfo, SensorType};
use sensorgrid_influx::{FluxQuery, FluxRecord, InfluxClient, TimeRange};

const DEFAULT_LIMIT: u32 = 100;

/// Optional conjunction of equality filters; each narrows the result only
/// when supplied.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub sensor_type: Option<SensorType>,
    pub sensor_id: Option<String>,
    pub location: Option<String>,
}

pub struct Historian {
    store: InfluxClient,
    raw_bucket: String,
    aggregated_bucket: String,
    readings_window: Duration,
    aggregates_window: Duration,
}

impl Historian {
    pub fn new(
        store: InfluxClient,
        raw_bucket: String,
        aggregated_bucket: String,
        readings_window_secs: u64,
        aggregates_window_secs: u64,
    ) -> Self {
        Self {
            store,
            raw_bucket,
            aggregated_bucket,
            readings_window: Duration::seconds(readings_window_secs as i64),
            aggregates_window: Duration::seconds(aggregates_window_secs as i64),
        }
    }

    /// Every location with at least one recorded point, with the number of
    /// distinct sensors seen there.
    pub async fn locations(&self) -> Vec<LocationInfo> {
        let query = FluxQuery::scan(&self.raw_bucket, TimeRange::full_history(Utc::now()))
            .field("value")
            .keep(&["sensorId", "location"])
            .group_by(&["location"])
            .distinct("sensorId");

        match self.store.query(&query).await {
            Ok(records) => count_locations(&records),
            Err(e) => {
                error!(error = %e, "Locations query failed");
                Vec::new()
            }
        }
    }

    /// Distinct sensor identities seen within the readings window. Sensors
    /// silent longer than the window are omitted by design.
    pub async fn sensors(&self) -> Vec<SensorInfo> {
        let range = TimeRange::last(self.readings_window, Utc::now());
        let query = FluxQuery::scan(&self.raw_bucket, range)
            .field("value")
            .group_by(&["sensorId", "location", "_measurement"])
            .distinct("sensorId");

        match self.store.query(&query).await {
            Ok(records) => sensor_set(&records),
            Err(e) => {
                error!(error = %e, "Sensors query failed");
                Vec::new()
            }
        }
    }

    /// Raw readings matching the filter, newest first
    pub async fn readings(
        &self,
        filter: &ReadingFilter,
        range: Option<TimeRange>,
        limit: Option<u32>,
    ) -> Vec<Reading> {
        let range = range.unwrap_or_else(|| TimeRange::last(self.readings_window, Utc::now()));

        let mut query = FluxQuery::scan(&self.raw_bucket, range)
            .field("value")
            .sort_desc()
            .limit(limit.unwrap_or(DEFAULT_LIMIT));
        if let Some(sensor_type) = filter.sensor_type {
            query = query.measurement(sensor_type.as_str());
        }
        if let Some(sensor_id) = &filter.sensor_id {
            query = query.tag("sensorId", sensor_id);
        }
        if let Some(location) = &filter.location {
            query = query.tag("location", location);
        }

        match self.store.query(&query).await {
            Ok(records) => records.iter().filter_map(reading_from_record).collect(),
            Err(e) => {
                error!(error = %e, "Readings query failed");
                Vec::new()
            }
        }
    }

    /// Pre-aggregated rollups matching the filter, newest first. Without a
    /// type filter the result is the union over every known aggregated
    /// series; a series that fails to read is skipped, not fatal.
    pub async fn aggregated(
        &self,
        filter: &ReadingFilter,
        range: Option<TimeRange>,
        limit: Option<u32>,
    ) -> Vec<AggregatedReading> {
        let range = range.unwrap_or_else(|| TimeRange::last(self.aggregates_window, Utc::now()));
        let types: Vec<SensorType> = match filter.sensor_type {
            Some(sensor_type) => vec![sensor_type],
            None => SensorType::ALL.to_vec(),
        };

        let mut results = Vec::new();
        for sensor_type in types {
            let mut query = FluxQuery::scan(&self.aggregated_bucket, range)
                .measurement(sensor_type.aggregated_measurement())
                .pivot_on_tag("type")
                .group_by(&["sensorId", "location"])
                .sort_desc()
                .limit(limit.unwrap_or(DEFAULT_LIMIT));
            if let Some(sensor_id) = &filter.sensor_id {
                query = query.tag("sensorId", sensor_id);
            }
            if let Some(location) = &filter.location {
                query = query.tag("location", location);
            }

            match self.store.query(&query).await {
                Ok(records) => results.extend(
                    records
                        .iter()
                        .filter_map(|r| aggregated_from_record(sensor_type, r)),
                ),
                Err(e) => {
                    error!(
                        measurement = %sensor_type.aggregated_measurement(),
                        error = %e,
                        "Aggregated query failed"
                    );
                }
            }
        }

        results
    }
}

fn count_locations(records: &[FluxRecord]) -> Vec<LocationInfo> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let location = record.get_string("location");
        if location.is_empty() {
            continue;
        }
        *counts.entry(location).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(name, sensor_count)| LocationInfo { name, sensor_count })
        .collect()
}

fn sensor_set(records: &[FluxRecord]) -> Vec<SensorInfo> {
    let unique: BTreeSet<SensorInfo> = records
        .iter()
        .filter_map(|record| {
            let sensor_id = record.get_string("sensorId");
            if sensor_id.is_empty() {
                return None;
            }
            Some(SensorInfo {
                sensor_id,
                sensor_type: record.get_string("_measurement"),
                location: record.get_string("location"),
            })
        })
        .collect();
    unique.into_iter().collect()
}

fn reading_from_record(record: &FluxRecord) -> Option<Reading> {
    let sensor_type = SensorType::parse(&record.get_string("_measurement"))?;
    let timestamp = match record.get_time("_time") {
        Some(t) => t,
        None => {
            warn!("Skipping reading row without a timestamp");
            return None;
        }
    };
    Some(Reading {
        sensor_id: record.get_string("sensorId"),
        sensor_type,
        location: record.get_string("location"),
        value: record.get_f64("_value"),
        unit: sensor_type.unit().to_string(),
        timestamp,
    })
}

/// Pivoted rollup row into one record per (sensorId, location, bucket).
/// Statistics the rollup omitted read as 0.0; the record is still emitted.
fn aggregated_from_record(sensor_type: SensorType, record: &FluxRecord) -> Option<AggregatedReading> {
    let timestamp = record.get_time("_time")?;
    Some(AggregatedReading {
        sensor_id: record.get_string("sensorId"),
        sensor_type,
        location: record.get_string("location"),
        mean: record.get_f64("mean"),
        min: record.get_f64("min"),
        max: record.get_f64("max"),
        sum: record.get_f64("sum"),
        count: record.get_f64("count"),
        unit: sensor_type.unit().to_string(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> FluxRecord {
        let columns: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FluxRecord::from_columns(columns)
    }

    #[test]
    fn locations_count_distinct_sensors() {
        let records = vec![
            record(&[("location", "Kitchen"), ("_value", "temp_002")]),
            record(&[("location", "Kitchen"), ("_value", "hum_002")]),
            record(&[("location", "Living Room"), ("_value", "temp_001")]),
            record(&[("location", "")]),
        ];
        let locations = count_locations(&records);
        assert_eq!(
            locations,
            vec![
                LocationInfo { name: "Kitchen".to_string(), sensor_count: 2 },
                LocationInfo { name: "Living Room".to_string(), sensor_count: 1 },
            ]
        );
    }

    #[test]
    fn sensor_set_deduplicates_identities() {
        let records = vec![
            record(&[("sensorId", "temp_001"), ("_measurement", "temperature"), ("location", "Living Room")]),
            record(&[("sensorId", "temp_001"), ("_measurement", "temperature"), ("location", "Living Room")]),
            record(&[("sensorId", "hum_001"), ("_measurement", "humidity"), ("location", "Living Room")]),
        ];
        let sensors = sensor_set(&records);
        assert_eq!(sensors.len(), 2);
    }

    #[test]
    fn reading_row_parses_with_unit_from_type() {
        let row = record(&[
            ("_measurement", "temperature"),
            ("_time", "2024-01-01T00:00:00Z"),
            ("_value", "21.5"),
            ("sensorId", "temp_001"),
            ("location", "Living Room"),
        ]);
        let reading = reading_from_record(&row).unwrap();
        assert_eq!(reading.unit, "°C");
        assert_eq!(reading.value, 21.5);
    }

    #[test]
    fn unknown_measurement_rows_are_skipped() {
        let row = record(&[
            ("_measurement", "pressure"),
            ("_time", "2024-01-01T00:00:00Z"),
            ("_value", "1013.0"),
        ]);
        assert!(reading_from_record(&row).is_none());
    }

    #[test]
    fn missing_statistic_defaults_to_zero_without_dropping_the_record() {
        let row = record(&[
            ("_time", "2024-01-01T00:00:00Z"),
            ("sensorId", "hum_001"),
            ("location", "Kitchen"),
            ("mean", "55.0"),
            ("min", "50.0"),
            ("max", "60.0"),
            ("count", "4"),
            // no "sum" column in this bucket
        ]);
        let aggregated = aggregated_from_record(SensorType::Humidity, &row).unwrap();
        assert_eq!(aggregated.sum, 0.0);
        assert_eq!(aggregated.mean, 55.0);
        assert_eq!(aggregated.count, 4.0);
    }

    #[test]
    fn aggregated_row_without_time_is_dropped() {
        let row = record(&[("sensorId", "hum_001"), ("mean", "55.0")]);
        assert!(aggregated_from_record(SensorType::Humidity, &row).is_none());
    }
}
