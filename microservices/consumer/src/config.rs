//! Ingestion consumer configuration

use std::path::PathBuf;

use sensorgrid_core::config::{env_or, env_parse};
use sensorgrid_core::{BusConfig, Result, StoreConfig};

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub bus: BusConfig,
    pub store: StoreConfig,
    pub temp_alert_threshold: f64,
    pub alert_state_file: PathBuf,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bus: BusConfig::from_env(),
            store: StoreConfig::from_env(),
            temp_alert_threshold: env_parse("TEMP_ALERT_THRESHOLD", 30.0)?,
            alert_state_file: PathBuf::from(env_or(
                "ALERT_STATE_FILE",
                "/app/data/alert_state.json",
            )),
        })
    }
}
