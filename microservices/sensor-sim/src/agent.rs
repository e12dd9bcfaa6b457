//! Sensor agent publish loop

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use sensorgrid_bus::{topic, BusClient};
use sensorgrid_core::{Reading, Result, SensorDescriptor};

use crate::waveform;

/// One simulated sensor: a descriptor plus its waveform generator.
/// Agents own their descriptor exclusively and share nothing with each
/// other; each runs as its own task.
pub struct SensorAgent {
    descriptor: SensorDescriptor,
}

impl SensorAgent {
    pub fn new(descriptor: SensorDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    /// Produce one reading at the current wall-clock time
    pub fn sample(&self) -> Reading {
        let now = Utc::now();
        let value = waveform::generate(
            self.descriptor.sensor_type,
            self.descriptor.min,
            self.descriptor.max,
            now,
            &mut rand::thread_rng(),
        );
        Reading {
            sensor_id: self.descriptor.sensor_id.clone(),
            sensor_type: self.descriptor.sensor_type,
            location: self.descriptor.location.clone(),
            value,
            unit: self.descriptor.unit.clone(),
            timestamp: now,
        }
    }

    /// Generate and publish readings until the publish path fails
    /// irrecoverably. Errors terminate this agent only.
    pub async fn run(&self, bus: Arc<dyn BusClient>) -> Result<()> {
        info!(
            sensor_id = %self.descriptor.sensor_id,
            sensor_type = %self.descriptor.sensor_type,
            location = %self.descriptor.location,
            "Starting sensor agent"
        );

        let topic = topic::reading_topic(self.descriptor.sensor_type, &self.descriptor.sensor_id);

        loop {
            let reading = self.sample();
            let payload = serde_json::to_vec(&reading)?;
            bus.publish(&topic, payload.into()).await?;

            info!(
                sensor_id = %reading.sensor_id,
                value = reading.value,
                unit = %reading.unit,
                "Published reading"
            );

            tokio::time::sleep(self.descriptor.publish_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::StreamExt;
    use sensorgrid_bus::MemoryBus;
    use sensorgrid_core::SensorType;

    fn agent() -> SensorAgent {
        SensorAgent::new(SensorDescriptor::new(
            "hum_001",
            SensorType::Humidity,
            "Living Room",
            40.0,
            60.0,
            7,
        ))
    }

    #[test]
    fn sample_carries_descriptor_identity() {
        let reading = agent().sample();
        assert_eq!(reading.sensor_id, "hum_001");
        assert_eq!(reading.sensor_type, SensorType::Humidity);
        assert_eq!(reading.location, "Living Room");
        assert_eq!(reading.unit, "%");
        assert!((40.0..=60.0).contains(&reading.value));
    }

    #[tokio::test]
    async fn published_reading_reaches_wildcard_subscriber_intact() {
        let bus = MemoryBus::new();
        let mut sub = bus.subscribe(topic::SENSORS_WILDCARD).await.unwrap();

        let agent = agent();
        let reading = agent.sample();
        let payload = Bytes::from(serde_json::to_vec(&reading).unwrap());
        bus.publish(
            &topic::reading_topic(reading.sensor_type, &reading.sensor_id),
            payload,
        )
        .await
        .unwrap();

        let msg = sub.next().await.unwrap();
        assert_eq!(msg.topic, "sensors.humidity.hum_001");
        let received: Reading = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(received, reading);
    }
}
