//! SensorGrid Influx - time-series store client
//!
//! This crate provides:
//! - Line Protocol generation for point writes (measurement = sensor type,
//!   tags = sensorId/location, field = value)
//! - A typed Flux query builder that lowers time range, equality predicates,
//!   pivoting, sorting, and limits into Flux source
//! - CSV decoding of `/api/v2/query` responses
//! - The HTTP client tying the three together, with bounded request timeouts

pub mod client;
pub mod error;
pub mod flux;
pub mod point;
pub mod response;

pub use client::InfluxClient;
pub use error::StoreError;
pub use flux::{FluxQuery, TimeRange};
pub use point::DataPoint;
pub use response::FluxRecord;
