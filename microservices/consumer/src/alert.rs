//! Temperature alerting
//!
//! Readings above the configured threshold publish an alert payload to the
//! `emails` namespace, where the external notifier forwards it over SMTP.
//! Alerts are throttled to one per 24 hours through a small JSON state file;
//! if the state cannot be read the alert is sent rather than suppressed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use sensorgrid_bus::{topic, BusClient};
use sensorgrid_core::{Reading, SensorType};

/// Payload consumed by the external email notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AlertState {
    #[serde(rename = "lastAlertTime")]
    last_alert_time: Option<DateTime<Utc>>,
}

pub struct AlertPublisher {
    threshold: f64,
    state_file: PathBuf,
}

impl AlertPublisher {
    pub fn new(threshold: f64, state_file: PathBuf) -> Self {
        Self {
            threshold,
            state_file,
        }
    }

    /// Publish an alert for the reading if it crosses the threshold and the
    /// throttle window allows it. Failures are logged and dropped; alerting
    /// never disturbs ingestion.
    pub async fn maybe_alert(&self, bus: &dyn BusClient, reading: &Reading) {
        if reading.sensor_type != SensorType::Temperature || reading.value <= self.threshold {
            return;
        }

        info!(
            sensor_id = %reading.sensor_id,
            location = %reading.location,
            value = reading.value,
            "High temperature detected"
        );

        if !self.should_send(Utc::now()) {
            return;
        }

        let alert = Self::build_alert(reading);
        let payload = match serde_json::to_vec(&alert) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to encode alert message");
                return;
            }
        };

        if let Err(e) = bus.publish(topic::EMAILS, payload.into()).await {
            warn!(error = %e, "Failed to publish temperature alert");
            return;
        }

        info!(sensor_id = %reading.sensor_id, "Temperature alert sent");

        if let Err(e) = self.save_state(AlertState {
            last_alert_time: Some(Utc::now()),
        }) {
            warn!(error = %e, "Failed to save alert state");
        }
    }

    fn build_alert(reading: &Reading) -> AlertMessage {
        AlertMessage {
            subject: format!("High Temperature Alert: {:.2}°C", reading.value),
            message: format!(
                "Warning: High temperature detected!\n\n\
                 Sensor ID: {}\n\
                 Location: {}\n\
                 Temperature: {:.2}°C\n\
                 Time: {}\n\n\
                 Please check the system as soon as possible.",
                reading.sensor_id,
                reading.location,
                reading.value,
                reading.timestamp.to_rfc2822(),
            ),
        }
    }

    /// One alert per 24h; unknown state errs on the side of alerting
    fn should_send(&self, now: DateTime<Utc>) -> bool {
        let state = match self.load_state() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Failed to load alert state");
                return true;
            }
        };

        match state.last_alert_time {
            Some(last) if now - last < Duration::hours(24) => {
                info!(last_alert = %last, "Alert already sent today, not sending again");
                false
            }
            _ => true,
        }
    }

    fn load_state(&self) -> std::io::Result<AlertState> {
        if !self.state_file.exists() {
            return Ok(AlertState::default());
        }
        let data = fs::read(&self.state_file)?;
        if data.is_empty() {
            return Ok(AlertState::default());
        }
        serde_json::from_slice(&data).map_err(std::io::Error::other)
    }

    fn save_state(&self, state: AlertState) -> std::io::Result<()> {
        if let Some(dir) = self.state_file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.state_file, serde_json::to_vec(&state)?)
    }
}
