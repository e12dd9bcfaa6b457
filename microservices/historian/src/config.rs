//! Historian configuration

use sensorgrid_core::config::env_parse;
use sensorgrid_core::{Result, StoreConfig};

#[derive(Debug, Clone)]
pub struct HistorianConfig {
    pub store: StoreConfig,
    pub http_port: u16,
    /// Default lookback for raw readings and the sensor discovery view
    pub readings_window_secs: u64,
    /// Default lookback for pre-aggregated series
    pub aggregates_window_secs: u64,
}

impl HistorianConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store: StoreConfig::from_env(),
            http_port: env_parse("HTTP_PORT", 8080)?,
            readings_window_secs: env_parse("READINGS_WINDOW_SECS", 3600)?,
            aggregates_window_secs: env_parse("AGGREGATES_WINDOW_SECS", 86400)?,
        })
    }
}
