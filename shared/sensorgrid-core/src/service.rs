//! Service infrastructure for all microservices

use async_trait::async_trait;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use crate::error::Result;

/// Standard trait all microservices implement
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Service identifier (e.g., "sensor-sim", "historian")
    fn service_id(&self) -> &'static str;

    /// Service version
    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Start the service (publish loops, subscriptions, HTTP servers)
    async fn start(&self) -> Result<()>;

    /// Graceful shutdown: flush and close bus/store connections. Runs even
    /// when `start` is still in flight.
    async fn shutdown(&self) -> Result<()>;
}

/// Standard microservice runtime bootstrap
pub struct ServiceRuntime {
    start_time: std::time::Instant,
}

impl ServiceRuntime {
    /// Run a microservice with standard lifecycle management
    pub async fn run<S: Service>(service: Arc<S>) -> Result<()> {
        let runtime = Self {
            start_time: std::time::Instant::now(),
        };

        info!(
            service_id = service.service_id(),
            version = service.version(),
            "Starting microservice"
        );

        let service_clone = service.clone();
        let service_handle = tokio::spawn(async move {
            if let Err(e) = service_clone.start().await {
                tracing::error!("Service error: {}", e);
            }
        });

        Self::wait_for_shutdown().await;

        info!("Shutdown signal received, gracefully stopping...");

        if let Err(e) = service.shutdown().await {
            warn!("Error during shutdown: {}", e);
        }

        service_handle.abort();

        info!(
            uptime_seconds = runtime.start_time.elapsed().as_secs(),
            "Microservice stopped"
        );

        Ok(())
    }

    async fn wait_for_shutdown() {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to listen for SIGTERM")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
