//! System configuration parameters
//!
//! All tunable parameters for the Siramin controller that are fixed for the
//! lifetime of the process.  The irrigation rule itself (thresholds, plant)
//! is *not* here: it is remote-configured at runtime and lives in
//! [`RuleStore`](crate::store::rules::RuleStore).

use embassy_time::Duration;
use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Device code used as the topic namespace (`device/{code}/...`).
    pub device_code: String<16>,
    /// Identifier of the pump actuator in the topic scheme.
    pub actuator_id: u8,

    // --- Pump cycle ---
    /// How long one watering burst runs (seconds)
    pub pump_run_secs: u16,
    /// Soak time after a burst before moisture is re-evaluated (seconds)
    pub pump_cooldown_secs: u16,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Minimum spacing between telemetry reports (seconds)
    pub publish_interval_secs: u16,
    /// Half-period of the low-moisture alert blink (milliseconds)
    pub alert_blink_ms: u32,

    // --- Broker ---
    /// MQTT broker host name or IP address
    pub mqtt_host: String<64>,
    /// MQTT broker TCP port
    pub mqtt_port: u16,
    /// MQTT client identifier
    pub mqtt_client_id: String<32>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_code: fixed("GH-001"),
            actuator_id: 1, // pump

            // Pump cycle
            pump_run_secs: 10,
            pump_cooldown_secs: 60,

            // Timing
            control_loop_interval_ms: 2000, // 0.5 Hz
            publish_interval_secs: 5,
            alert_blink_ms: 500,

            // Broker
            mqtt_host: fixed("202.10.48.12"),
            mqtt_port: 1883,
            mqtt_client_id: fixed("ESP32_Plant_Monitor"),
        }
    }
}

impl SystemConfig {
    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_code.is_empty() || self.device_code.contains('/') {
            return Err(ConfigError::ValidationFailed("device_code"));
        }
        if self.pump_run_secs == 0 {
            return Err(ConfigError::ValidationFailed("pump_run_secs"));
        }
        if self.pump_cooldown_secs == 0 {
            return Err(ConfigError::ValidationFailed("pump_cooldown_secs"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("control_loop_interval_ms"));
        }
        if self.publish_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("publish_interval_secs"));
        }
        if self.mqtt_host.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt_host"));
        }
        if self.mqtt_port == 0 {
            return Err(ConfigError::ValidationFailed("mqtt_port"));
        }
        Ok(())
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.pump_run_secs))
    }

    pub fn cooldown_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.pump_cooldown_secs))
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.publish_interval_secs))
    }

    /// Broker URL in the form the ESP-IDF MQTT client expects.
    pub fn mqtt_url(&self) -> Result<String<96>, ConfigError> {
        use core::fmt::Write;

        let mut url = String::new();
        write!(url, "mqtt://{}:{}", self.mqtt_host, self.mqtt_port)
            .map_err(|_| ConfigError::CapacityExceeded("mqtt url"))?;
        Ok(url)
    }
}

/// Copy `s` into a fixed-capacity string, truncating at the last whole
/// character that fits.
pub(crate) fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
