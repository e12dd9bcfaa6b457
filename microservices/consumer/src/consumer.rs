//! Ingestion: bus messages into stored points
//!
//! One store write per message, no batching, no dedup, no retry. A message
//! that fails to decode or to write is logged and dropped; the subscription
//! keeps running.

use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use sensorgrid_bus::{topic, BusClient, BusMessage};
use sensorgrid_core::{Error, Reading, Result};
use sensorgrid_influx::{DataPoint, InfluxClient};

use crate::alert::AlertPublisher;

/// Decode one bus payload into a Reading. Tolerates both the camelCase and
/// the legacy snake_case field naming found across producers.
pub fn decode_reading(payload: &[u8]) -> Result<Reading> {
    serde_json::from_slice(payload).map_err(|e| Error::Decode(e.to_string()))
}

pub struct DataConsumer {
    bus: Arc<dyn BusClient>,
    store: InfluxClient,
    bucket: String,
    alerts: AlertPublisher,
}

impl DataConsumer {
    pub fn new(
        bus: Arc<dyn BusClient>,
        store: InfluxClient,
        bucket: String,
        alerts: AlertPublisher,
    ) -> Self {
        Self {
            bus,
            store,
            bucket,
            alerts,
        }
    }

    /// Subscribe to the whole sensor namespace and ingest until the
    /// subscription ends. Messages are handled sequentially; ordering
    /// across sensors is not assumed anywhere downstream.
    pub async fn run(&self) -> Result<()> {
        let mut messages = self.bus.subscribe(topic::SENSORS_WILDCARD).await?;
        info!(pattern = topic::SENSORS_WILDCARD, "Subscribed to all sensor topics");

        while let Some(msg) = messages.next().await {
            self.handle_message(&msg).await;
        }

        Ok(())
    }

    async fn handle_message(&self, msg: &BusMessage) {
        let reading = match decode_reading(&msg.payload) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(topic = %msg.topic, error = %e, "Dropping undecodable message");
                return;
            }
        };

        debug!(
            topic = %msg.topic,
            sensor_id = %reading.sensor_id,
            value = reading.value,
            "Received reading"
        );

        let point = DataPoint::from_reading(&reading);
        match self.store.write_point(&self.bucket, &point).await {
            Ok(()) => info!(
                sensor_type = %reading.sensor_type,
                sensor_id = %reading.sensor_id,
                "Stored reading"
            ),
            // Accepted data-loss window: log and drop, no retry, no
            // dead-letter.
            Err(e) => warn!(
                sensor_id = %reading.sensor_id,
                error = %e,
                "Dropping reading after failed store write"
            ),
        }

        self.alerts.maybe_alert(self.bus.as_ref(), &reading).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorgrid_core::SensorType;

    #[test]
    fn decodes_camel_case_payload() {
        let payload = r#"{"sensorId":"temp_001","sensorType":"temperature","location":"Living Room","value":21.5,"unit":"°C","timestamp":"2024-01-01T00:00:00Z"}"#.as_bytes();
        let reading = decode_reading(payload).unwrap();
        assert_eq!(reading.sensor_id, "temp_001");
        assert_eq!(reading.sensor_type, SensorType::Temperature);
    }

    #[test]
    fn decodes_legacy_snake_case_payload() {
        let payload = br#"{"sensor_id":"elec_002","sensor_type":"electricity","location":"Kitchen","value":1.25,"unit":"kW","timestamp":"2024-01-01T06:30:00Z"}"#;
        let reading = decode_reading(payload).unwrap();
        assert_eq!(reading.sensor_id, "elec_002");
        assert_eq!(reading.sensor_type, SensorType::Electricity);
        assert_eq!(reading.value, 1.25);
    }

    #[test]
    fn both_variants_normalize_identically() {
        let camel = decode_reading(
            br#"{"sensorId":"hum_001","sensorType":"humidity","location":"Kitchen","value":55.5,"unit":"%","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let snake = decode_reading(
            br#"{"sensor_id":"hum_001","sensor_type":"humidity","location":"Kitchen","value":55.5,"unit":"%","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
    }

    #[test]
    fn missing_unit_is_tolerated() {
        let reading = decode_reading(
            br#"{"sensor_id":"temp_001","sensor_type":"temperature","location":"Living Room","value":21.5,"timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(reading.unit, "");
    }

    #[test]
    fn malformed_payloads_are_decode_errors() {
        assert!(matches!(decode_reading(b"not json"), Err(Error::Decode(_))));
        assert!(matches!(
            decode_reading(br#"{"sensorId":"x"}"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_reading(
                br#"{"sensorId":"x","sensorType":"pressure","location":"y","value":1.0,"unit":"u","timestamp":"2024-01-01T00:00:00Z"}"#
            ),
            Err(Error::Decode(_))
        ));
    }
}
