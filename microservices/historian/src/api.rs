//! GraphQL API surface
//!
//! Read-only schema over the historian: raw readings, aggregated rollups,
//! and the two discovery views. Field and argument names mirror the wire
//! shape (camelCase) that existing dashboards query.

use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use async_graphql_axum::GraphQL;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use sensorgrid_core::{AggregatedReading, LocationInfo, Reading, SensorInfo, SensorType};
use sensorgrid_influx::TimeRange;

use crate::queries::{Historian, ReadingFilter};

pub type HistorianSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn sensor_readings(
        &self,
        ctx: &Context<'_>,
        sensor_type: Option<String>,
        sensor_id: Option<String>,
        location: Option<String>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Vec<ReadingGql> {
        let historian = ctx.data_unchecked::<Arc<Historian>>();
        let filter = match build_filter(sensor_type, sensor_id, location) {
            Some(filter) => filter,
            None => return Vec::new(),
        };
        historian
            .readings(&filter, explicit_range(start_time, end_time), limit)
            .await
            .into_iter()
            .map(ReadingGql::from)
            .collect()
    }

    async fn aggregated_readings(
        &self,
        ctx: &Context<'_>,
        sensor_type: Option<String>,
        sensor_id: Option<String>,
        location: Option<String>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Vec<AggregatedReadingGql> {
        let historian = ctx.data_unchecked::<Arc<Historian>>();
        let filter = match build_filter(sensor_type, sensor_id, location) {
            Some(filter) => filter,
            None => return Vec::new(),
        };
        historian
            .aggregated(&filter, explicit_range(start_time, end_time), limit)
            .await
            .into_iter()
            .map(AggregatedReadingGql::from)
            .collect()
    }

    async fn locations(&self, ctx: &Context<'_>) -> Vec<LocationGql> {
        let historian = ctx.data_unchecked::<Arc<Historian>>();
        historian
            .locations()
            .await
            .into_iter()
            .map(LocationGql::from)
            .collect()
    }

    async fn sensors(&self, ctx: &Context<'_>) -> Vec<SensorGql> {
        let historian = ctx.data_unchecked::<Arc<Historian>>();
        historian
            .sensors()
            .await
            .into_iter()
            .map(SensorGql::from)
            .collect()
    }
}

/// A sensorType string that names no known category matches nothing, so the
/// resolver short-circuits to an empty result.
fn build_filter(
    sensor_type: Option<String>,
    sensor_id: Option<String>,
    location: Option<String>,
) -> Option<ReadingFilter> {
    let sensor_type = match sensor_type {
        Some(raw) => Some(SensorType::parse(&raw)?),
        None => None,
    };
    Some(ReadingFilter {
        sensor_type,
        sensor_id,
        location,
    })
}

/// Range from explicitly supplied bounds; `None` defers to the historian's
/// per-operation default window.
fn explicit_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<TimeRange> {
    match (start, end) {
        (None, None) => None,
        (start, end) => {
            let stop = end.unwrap_or_else(Utc::now);
            Some(TimeRange::new(start.unwrap_or(stop - chrono::Duration::hours(1)), stop))
        }
    }
}

// GraphQL Types
#[derive(SimpleObject)]
pub struct ReadingGql {
    pub sensor_id: String,
    pub sensor_type: String,
    pub location: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Reading> for ReadingGql {
    fn from(r: Reading) -> Self {
        Self {
            sensor_id: r.sensor_id,
            sensor_type: r.sensor_type.to_string(),
            location: r.location,
            value: r.value,
            unit: r.unit,
            timestamp: r.timestamp,
        }
    }
}

#[derive(SimpleObject)]
pub struct AggregatedReadingGql {
    pub sensor_id: String,
    pub sensor_type: String,
    pub location: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl From<AggregatedReading> for AggregatedReadingGql {
    fn from(r: AggregatedReading) -> Self {
        Self {
            sensor_id: r.sensor_id,
            sensor_type: r.sensor_type.to_string(),
            location: r.location,
            mean: r.mean,
            min: r.min,
            max: r.max,
            sum: r.sum,
            count: r.count,
            unit: r.unit,
            timestamp: r.timestamp,
        }
    }
}

#[derive(SimpleObject)]
pub struct LocationGql {
    pub name: String,
    pub sensor_count: u64,
}

impl From<LocationInfo> for LocationGql {
    fn from(l: LocationInfo) -> Self {
        Self {
            name: l.name,
            sensor_count: l.sensor_count,
        }
    }
}

#[derive(SimpleObject)]
pub struct SensorGql {
    pub sensor_id: String,
    pub sensor_type: String,
    pub location: String,
}

impl From<SensorInfo> for SensorGql {
    fn from(s: SensorInfo) -> Self {
        Self {
            sensor_id: s.sensor_id,
            sensor_type: s.sensor_type,
            location: s.location,
        }
    }
}

/// Build the GraphQL schema with the historian injected as context data
pub fn build_schema(historian: Arc<Historian>) -> HistorianSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(historian)
        .finish()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Router serving the query endpoint and the GraphiQL playground
pub fn router(schema: HistorianSchema) -> Router {
    Router::new().route("/graphql", get(graphiql).post_service(GraphQL::new(schema)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unknown_sensor_type_yields_no_filter() {
        assert!(build_filter(Some("pressure".to_string()), None, None).is_none());
    }

    #[test]
    fn filters_pass_through_unchanged() {
        let filter = build_filter(
            Some("humidity".to_string()),
            Some("hum_001".to_string()),
            Some("Kitchen".to_string()),
        )
        .unwrap();
        assert_eq!(filter.sensor_type, Some(SensorType::Humidity));
        assert_eq!(filter.sensor_id.as_deref(), Some("hum_001"));
        assert_eq!(filter.location.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn absent_bounds_defer_to_default_window() {
        assert!(explicit_range(None, None).is_none());
    }

    #[test]
    fn explicit_bounds_are_used_verbatim() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let range = explicit_range(Some(start), Some(end)).unwrap();
        assert_eq!(range.start, start);
        assert_eq!(range.stop, end);
    }

    #[test]
    fn start_only_extends_to_now() {
        let start = Utc::now() - chrono::Duration::hours(2);
        let range = explicit_range(Some(start), None).unwrap();
        assert_eq!(range.start, start);
        assert!(range.stop >= start);
    }
}
