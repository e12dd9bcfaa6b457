//! NATS adapter for the bus capability

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tracing::debug;

use sensorgrid_core::{Error, Result};

use crate::{BusClient, BusMessage, MessageStream};

/// Bus client backed by a NATS connection.
///
/// The connection is established once at startup and lives for the process
/// lifetime; dropping the client closes it.
#[derive(Clone)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to the bus. A failure here is fatal to service startup.
    pub async fn connect(url: &str) -> Result<Self> {
        debug!(url = %url, "Connecting to NATS");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| Error::Transport(format!("NATS connect failed: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BusClient for NatsBus {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        self.client
            .publish(topic.to_string(), payload)
            .await
            .map_err(|e| Error::Transport(format!("NATS publish failed: {}", e)))
    }

    async fn subscribe(&self, pattern: &str) -> Result<MessageStream> {
        let subscriber = self
            .client
            .subscribe(pattern.to_string())
            .await
            .map_err(|e| Error::Transport(format!("NATS subscribe failed: {}", e)))?;

        Ok(Box::pin(subscriber.map(|msg| BusMessage {
            topic: msg.subject.to_string(),
            payload: msg.payload,
        })))
    }

    async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .map_err(|e| Error::Transport(format!("NATS flush failed: {}", e)))
    }
}
