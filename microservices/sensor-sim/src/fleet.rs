//! Static fleet definition
//!
//! Descriptors are built once at startup and never mutated.

use sensorgrid_core::{SensorDescriptor, SensorType};

/// The default simulated fleet: four temperature, three humidity, and three
/// electricity sensors spread over the house.
pub fn default_fleet() -> Vec<SensorDescriptor> {
    vec![
        // Temperature sensors
        SensorDescriptor::new("temp_001", SensorType::Temperature, "Living Room", 18.0, 26.0, 5),
        SensorDescriptor::new("temp_002", SensorType::Temperature, "Kitchen", 19.0, 28.0, 5),
        SensorDescriptor::new("temp_003", SensorType::Temperature, "Bedroom", 16.0, 24.0, 5),
        SensorDescriptor::new("temp_004", SensorType::Temperature, "Outside", 5.0, 35.0, 5),
        // Humidity sensors
        SensorDescriptor::new("hum_001", SensorType::Humidity, "Living Room", 40.0, 60.0, 7),
        SensorDescriptor::new("hum_002", SensorType::Humidity, "Kitchen", 45.0, 70.0, 7),
        SensorDescriptor::new("hum_003", SensorType::Humidity, "Bathroom", 50.0, 85.0, 7),
        // Electricity usage sensors
        SensorDescriptor::new("elec_001", SensorType::Electricity, "Main Panel", 0.5, 8.0, 10),
        SensorDescriptor::new("elec_002", SensorType::Electricity, "Kitchen", 0.1, 3.0, 10),
        SensorDescriptor::new("elec_003", SensorType::Electricity, "Living Room", 0.05, 2.0, 10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sensor_ids_are_unique() {
        let fleet = default_fleet();
        let ids: HashSet<_> = fleet.iter().map(|d| d.sensor_id.as_str()).collect();
        assert_eq!(ids.len(), fleet.len());
    }

    #[test]
    fn every_descriptor_has_a_valid_band() {
        for desc in default_fleet() {
            assert!(desc.min < desc.max, "{} band inverted", desc.sensor_id);
            assert!(desc.publish_interval_secs > 0);
        }
    }
}
