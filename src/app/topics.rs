//! MQTT topic scheme.
//!
//! ```text
//!  device/{code}/rule                        ◀── rule updates
//!  device/{code}/actuator/{id}/mode          ◀── auto | manual
//!  device/{code}/actuator/{id}/status        ◀── on | off
//!  device/{code}/actuator/{id}/actual-status ──▶ pump output
//!  device/{code}/sensor/1                    ──▶ soil moisture
//!  device/{code}/sensor/2                    ──▶ temperature
//!  device/{code}/sensor/3                    ──▶ humidity
//! ```
//!
//! All strings are built once at startup from the configured device code
//! and actuator id.

use core::fmt::Write;

use heapless::String;

use crate::error::ConfigError;

/// Capacity of any topic string.
pub const TOPIC_CAP: usize = 64;

/// Which inbound stream a topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    Mode,
    Status,
    Rule,
}

/// Every topic this device publishes or subscribes to.
#[derive(Debug, Clone)]
pub struct Topics {
    mode: String<TOPIC_CAP>,
    status: String<TOPIC_CAP>,
    rule: String<TOPIC_CAP>,
    actual_status: String<TOPIC_CAP>,
    moisture: String<TOPIC_CAP>,
    temperature: String<TOPIC_CAP>,
    humidity: String<TOPIC_CAP>,
}

impl Topics {
    pub fn new(device_code: &str, actuator_id: u8) -> Result<Self, ConfigError> {
        let actuator = |leaf: &str| {
            build(format_args!("device/{device_code}/actuator/{actuator_id}/{leaf}"))
        };
        let sensor = |n: u8| build(format_args!("device/{device_code}/sensor/{n}"));

        Ok(Self {
            mode: actuator("mode")?,
            status: actuator("status")?,
            rule: build(format_args!("device/{device_code}/rule"))?,
            actual_status: actuator("actual-status")?,
            moisture: sensor(1)?,
            temperature: sensor(2)?,
            humidity: sensor(3)?,
        })
    }

    /// Topics to subscribe to after every (re)connect.
    pub fn subscriptions(&self) -> [&str; 3] {
        [self.mode.as_str(), self.status.as_str(), self.rule.as_str()]
    }

    /// Map an inbound topic to its stream, `None` if it is not ours.
    pub fn classify(&self, topic: &str) -> Option<InboundTopic> {
        if topic == self.mode.as_str() {
            Some(InboundTopic::Mode)
        } else if topic == self.status.as_str() {
            Some(InboundTopic::Status)
        } else if topic == self.rule.as_str() {
            Some(InboundTopic::Rule)
        } else {
            None
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn actual_status(&self) -> &str {
        &self.actual_status
    }

    pub fn moisture(&self) -> &str {
        &self.moisture
    }

    pub fn temperature(&self) -> &str {
        &self.temperature
    }

    pub fn humidity(&self) -> &str {
        &self.humidity
    }
}

fn build(args: core::fmt::Arguments<'_>) -> Result<String<TOPIC_CAP>, ConfigError> {
    let mut s = String::new();
    s.write_fmt(args)
        .map_err(|_| ConfigError::CapacityExceeded("topic"))?;
    Ok(s)
}
