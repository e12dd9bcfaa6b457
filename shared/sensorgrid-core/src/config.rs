//! Configuration management for microservices
//!
//! Each service composes its own config from these shared sections plus its
//! service-specific options, all read from the environment at startup.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Get an environment variable or fall back to a default
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, falling back to a default.
/// A present-but-unparseable value is a configuration error, not a silent
/// fallback.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Message bus connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    pub url: String,
}

impl BusConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("NATS_URL", "nats://nats:4222"),
        }
    }
}

/// Time-series store connection settings. The raw and aggregated buckets are
/// distinct; the rollup job writes the latter.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub raw_bucket: String,
    pub aggregated_bucket: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("INFLUXDB_URL", "http://influxdb:8086"),
            token: env_or("INFLUXDB_TOKEN", ""),
            org: env_or("INFLUXDB_ORG", "acme_corp"),
            raw_bucket: env_or("INFLUXDB_RAW_BUCKET", "sensor_data"),
            aggregated_bucket: env_or("INFLUXDB_AGGREGATED_BUCKET", "aggregated_data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_when_unset() {
        let value: f64 = env_parse("SENSORGRID_TEST_UNSET_VAR", 30.0).unwrap();
        assert_eq!(value, 30.0);
    }

    #[test]
    fn env_parse_rejects_garbage() {
        env::set_var("SENSORGRID_TEST_BAD_FLOAT", "not-a-number");
        let result: Result<f64> = env_parse("SENSORGRID_TEST_BAD_FLOAT", 1.0);
        assert!(matches!(result, Err(Error::Config(_))));
        env::remove_var("SENSORGRID_TEST_BAD_FLOAT");
    }
}
