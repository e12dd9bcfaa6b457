//! Topic naming and subject matching
//!
//! Reading topics are keyed `sensors.<sensorType>.<sensorId>` so subscribers
//! can match by type (`sensors.temperature.*`), by sensor, or across the
//! whole fleet (`sensors.>`). The unrelated `emails` namespace carries alert
//! payloads consumed by the external notifier.

use sensorgrid_core::SensorType;

/// Wildcard covering every sensor reading topic
pub const SENSORS_WILDCARD: &str = "sensors.>";

/// Namespace for outbound alert payloads `{subject, message}`
pub const EMAILS: &str = "emails";

/// Fully qualified topic for one sensor's readings
pub fn reading_topic(sensor_type: SensorType, sensor_id: &str) -> String {
    format!("sensors.{}.{}", sensor_type, sensor_id)
}

/// NATS-style subject matching: `*` matches exactly one token, a trailing
/// `>` matches one or more remaining tokens.
pub fn matches(pattern: &str, subject: &str) -> bool {
    let mut subject_tokens = subject.split('.');
    let mut pattern_tokens = pattern.split('.').peekable();

    loop {
        match (pattern_tokens.next(), subject_tokens.next()) {
            (Some(">"), Some(_)) => return pattern_tokens.peek().is_none(),
            (Some(">"), None) => return false,
            (Some("*"), Some(_)) => {}
            (Some(p), Some(s)) if p == s => {}
            (Some(_), _) => return false,
            (None, Some(_)) => return false,
            (None, None) => return true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_topic_is_hierarchical() {
        assert_eq!(
            reading_topic(SensorType::Temperature, "temp_001"),
            "sensors.temperature.temp_001"
        );
    }

    #[test]
    fn wildcard_covers_all_readings() {
        assert!(matches(SENSORS_WILDCARD, "sensors.temperature.temp_001"));
        assert!(matches(SENSORS_WILDCARD, "sensors.humidity.hum_003"));
        assert!(matches(SENSORS_WILDCARD, "sensors.electricity.elec_002"));
    }

    #[test]
    fn wildcard_needs_at_least_one_token() {
        assert!(!matches(SENSORS_WILDCARD, "sensors"));
        assert!(!matches(SENSORS_WILDCARD, "emails"));
    }

    #[test]
    fn star_matches_exactly_one_token() {
        assert!(matches("sensors.temperature.*", "sensors.temperature.temp_001"));
        assert!(!matches("sensors.temperature.*", "sensors.humidity.hum_001"));
        assert!(!matches("sensors.*", "sensors.temperature.temp_001"));
    }

    #[test]
    fn literal_subjects_match_themselves() {
        assert!(matches("emails", "emails"));
        assert!(!matches("emails", "emails.bounced"));
    }
}
