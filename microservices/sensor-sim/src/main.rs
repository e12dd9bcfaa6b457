//! Sensor Simulator
//!
//! Runs the simulated sensor fleet: one concurrent agent per descriptor,
//! each publishing synthetic readings to `sensors.<type>.<id>` on its own
//! interval. Agents are isolated failure domains; one agent's transport
//! failure is logged without taking down its siblings.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use sensorgrid_bus::{BusClient, NatsBus};
use sensorgrid_core::{Result, SensorDescriptor, Service, ServiceRuntime};

mod agent;
mod config;
mod fleet;
mod waveform;

use agent::SensorAgent;
use config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sensor_sim=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Sensor Simulator");

    let service = Arc::new(SensorSimService::new().await?);
    ServiceRuntime::run(service).await
}

pub struct SensorSimService {
    bus: NatsBus,
    fleet: Vec<SensorDescriptor>,
}

impl SensorSimService {
    pub async fn new() -> Result<Self> {
        let config = SimConfig::from_env()?;

        info!(url = %config.bus.url, "Connecting to bus");
        let bus = NatsBus::connect(&config.bus.url).await?;

        Ok(Self {
            bus,
            fleet: fleet::default_fleet(),
        })
    }
}

#[async_trait::async_trait]
impl Service for SensorSimService {
    fn service_id(&self) -> &'static str {
        "sensor-sim"
    }

    async fn start(&self) -> Result<()> {
        let mut agents = JoinSet::new();

        for descriptor in &self.fleet {
            let agent = SensorAgent::new(descriptor.clone());
            let bus: Arc<dyn BusClient> = Arc::new(self.bus.clone());
            agents.spawn(async move {
                let sensor_id = agent.descriptor().sensor_id.clone();
                if let Err(e) = agent.run(bus).await {
                    error!(sensor_id = %sensor_id, error = %e, "Sensor agent failed");
                }
                sensor_id
            });
        }

        info!(agents = self.fleet.len(), "Fleet running");

        // Agents run forever; any exit here is a failure worth surfacing.
        while let Some(exited) = agents.join_next().await {
            match exited {
                Ok(sensor_id) => warn!(sensor_id = %sensor_id, "Sensor agent exited"),
                Err(e) => error!(error = %e, "Sensor agent task aborted"),
            }
        }

        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down sensor simulator");
        self.bus.flush().await
    }
}
