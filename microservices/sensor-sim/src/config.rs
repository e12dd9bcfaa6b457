//! Sensor simulator configuration

use sensorgrid_core::{BusConfig, Result};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub bus: BusConfig,
}

impl SimConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bus: BusConfig::from_env(),
        })
    }
}
