//! In-process bus used by tests
//!
//! Same delivery contract as the NATS adapter: fan-out by subject match,
//! no acknowledgments, messages published with no live subscriber are lost.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use sensorgrid_core::Result;

use crate::topic;
use crate::{BusClient, BusMessage, MessageStream};

struct Subscription {
    pattern: String,
    tx: mpsc::UnboundedSender<BusMessage>,
}

/// In-memory fan-out bus
#[derive(Clone, Default)]
pub struct MemoryBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BusClient for MemoryBus {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        let mut subscriptions = self.subscriptions.write();
        subscriptions.retain(|sub| !sub.tx.is_closed());
        for sub in subscriptions.iter() {
            if topic::matches(&sub.pattern, topic) {
                let _ = sub.tx.send(BusMessage {
                    topic: topic.to_string(),
                    payload: payload.clone(),
                });
            }
        }
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<MessageStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions.write().push(Subscription {
            pattern: pattern.to_string(),
            tx,
        });
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn wildcard_subscriber_receives_typed_topic() {
        let bus = MemoryBus::new();
        let mut sub = bus.subscribe(topic::SENSORS_WILDCARD).await.unwrap();

        let payload = Bytes::from_static(b"{\"sensorId\":\"temp_001\"}");
        bus.publish("sensors.temperature.temp_001", payload.clone())
            .await
            .unwrap();

        let msg = sub.next().await.unwrap();
        assert_eq!(msg.topic, "sensors.temperature.temp_001");
        assert_eq!(msg.payload, payload);
    }

    #[tokio::test]
    async fn unrelated_namespace_is_not_delivered() {
        let bus = MemoryBus::new();
        let mut sub = bus.subscribe(topic::SENSORS_WILDCARD).await.unwrap();

        bus.publish(topic::EMAILS, Bytes::from_static(b"{}"))
            .await
            .unwrap();
        bus.publish("sensors.humidity.hum_001", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let msg = sub.next().await.unwrap();
        assert_eq!(msg.topic, "sensors.humidity.hum_001");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_lost_not_an_error() {
        let bus = MemoryBus::new();
        bus.publish("sensors.temperature.temp_001", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let mut sub = bus.subscribe(topic::SENSORS_WILDCARD).await.unwrap();
        bus.publish("sensors.temperature.temp_001", Bytes::from_static(b"later"))
            .await
            .unwrap();
        let msg = sub.next().await.unwrap();
        assert_eq!(msg.payload, Bytes::from_static(b"later"));
    }

    #[tokio::test]
    async fn fan_out_reaches_every_matching_subscriber() {
        let bus = MemoryBus::new();
        let mut all = bus.subscribe(topic::SENSORS_WILDCARD).await.unwrap();
        let mut typed = bus.subscribe("sensors.temperature.*").await.unwrap();

        bus.publish("sensors.temperature.temp_002", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert_eq!(all.next().await.unwrap().topic, "sensors.temperature.temp_002");
        assert_eq!(typed.next().await.unwrap().topic, "sensors.temperature.temp_002");
    }
}
