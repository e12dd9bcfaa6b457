//! Ingestion Consumer
//!
//! Subscribes to every sensor topic, normalizes payloads, and writes one
//! point per reading into the raw bucket. Connections to the bus and the
//! store are established once at startup and released on shutdown.

use std::sync::Arc;
use tracing::info;

use sensorgrid_bus::{BusClient, NatsBus};
use sensorgrid_core::{Error, Result, Service, ServiceRuntime};
use sensorgrid_influx::InfluxClient;

mod alert;
mod config;
mod consumer;

use alert::AlertPublisher;
use config::ConsumerConfig;
use consumer::DataConsumer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("consumer=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Ingestion Consumer");

    let service = Arc::new(ConsumerService::new().await?);
    ServiceRuntime::run(service).await
}

pub struct ConsumerService {
    bus: NatsBus,
    consumer: DataConsumer,
}

impl ConsumerService {
    pub async fn new() -> Result<Self> {
        let config = ConsumerConfig::from_env()?;

        info!(url = %config.store.url, "Connecting to store");
        let store = InfluxClient::from_config(&config.store)
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!(url = %config.bus.url, "Connecting to bus");
        let bus = NatsBus::connect(&config.bus.url).await?;

        let alerts = AlertPublisher::new(config.temp_alert_threshold, config.alert_state_file);
        let consumer = DataConsumer::new(
            Arc::new(bus.clone()),
            store,
            config.store.raw_bucket,
            alerts,
        );

        Ok(Self { bus, consumer })
    }
}

#[async_trait::async_trait]
impl Service for ConsumerService {
    fn service_id(&self) -> &'static str {
        "consumer"
    }

    async fn start(&self) -> Result<()> {
        self.consumer.run().await
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down consumer");
        // Store writes are synchronous per message; only the bus needs a
        // flush before the connections drop.
        self.bus.flush().await
    }
}
