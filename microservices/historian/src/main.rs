//! Historian
//!
//! Stateless read path over the time-series store: raw readings,
//! pre-aggregated rollups, and discovery views, exposed as a GraphQL API.

use std::sync::Arc;
use tracing::info;

use sensorgrid_core::{Error, Result, Service, ServiceRuntime};
use sensorgrid_influx::InfluxClient;

mod api;
mod config;
mod queries;

use config::HistorianConfig;
use queries::Historian;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("historian=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Historian");

    let service = Arc::new(HistorianService::new().await?);
    ServiceRuntime::run(service).await
}

pub struct HistorianService {
    historian: Arc<Historian>,
    http_port: u16,
}

impl HistorianService {
    pub async fn new() -> Result<Self> {
        let config = HistorianConfig::from_env()?;

        info!(url = %config.store.url, "Connecting to store");
        let store = InfluxClient::from_config(&config.store)
            .map_err(|e| Error::Internal(e.to_string()))?;

        let historian = Arc::new(Historian::new(
            store,
            config.store.raw_bucket.clone(),
            config.store.aggregated_bucket.clone(),
            config.readings_window_secs,
            config.aggregates_window_secs,
        ));

        Ok(Self {
            historian,
            http_port: config.http_port,
        })
    }
}

#[async_trait::async_trait]
impl Service for HistorianService {
    fn service_id(&self) -> &'static str {
        "historian"
    }

    async fn start(&self) -> Result<()> {
        let schema = api::build_schema(self.historian.clone());
        let router = api::router(schema);

        let addr = format!("0.0.0.0:{}", self.http_port);
        info!(addr = %addr, "Serving GraphQL API");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(e.to_string()))
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down historian");
        Ok(())
    }
}
