//! SensorGrid Bus - publish/subscribe transport capability
//!
//! Producers publish readings to hierarchical topics
//! (`sensors.<type>.<id>`); the ingestion consumer subscribes with a
//! wildcard over the whole namespace. Delivery is at-least-once and
//! fire-and-forget: subscribers get no acknowledgment contract and messages
//! published while a subscriber is down are lost.
//!
//! Services depend on the [`BusClient`] capability, injected at startup.
//! [`NatsBus`] is the production adapter; [`MemoryBus`] backs tests.

pub mod memory;
pub mod nats;
pub mod topic;

pub use memory::MemoryBus;
pub use nats::NatsBus;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;

use sensorgrid_core::Result;

/// One message delivered by the bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Bytes,
}

pub type MessageStream = Pin<Box<dyn Stream<Item = BusMessage> + Send>>;

/// Publish/subscribe capability over the message bus
#[async_trait]
pub trait BusClient: Send + Sync + 'static {
    /// Publish one message to a fully qualified topic
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()>;

    /// Subscribe to a topic pattern (`*` matches one token, `>` the rest)
    async fn subscribe(&self, pattern: &str) -> Result<MessageStream>;

    /// Flush any buffered publishes to the transport
    async fn flush(&self) -> Result<()>;
}
