//! Outbound telemetry: the publish-rate gate and payload production.
//!
//! The control loop runs every couple of seconds but the broker only needs
//! a fresh value every [`SystemConfig::publish_interval`](crate::config::SystemConfig::publish_interval).
//! [`TelemetryGate`] decides *when*; [`TelemetryData::to_messages`] decides
//! *what*, including dropping climate values the sensor could not supply.

use core::fmt::Write;

use embassy_time::{Duration, Instant};
use heapless::{String, Vec};
use log::warn;
use serde::Serialize;

use crate::app::topics::{TOPIC_CAP, Topics};
use crate::sensors::ClimateReading;

/// Capacity of an encoded `{"value":"..."}` payload.
pub const PAYLOAD_CAP: usize = 48;

/// Climate values at or below this are treated as "no reading".
const MIN_PUBLISHABLE: f32 = 0.1;

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Rate limiter for outbound reporting.
pub struct TelemetryGate {
    interval: Duration,
    last: Option<Instant>,
}

impl TelemetryGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Invoke `producer` and return its output if the interval has elapsed
    /// since the last publish (or nothing has been published yet).
    /// Otherwise `producer` is not called.
    pub fn maybe_publish<T>(&mut self, now: Instant, producer: impl FnOnce() -> T) -> Option<T> {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last = Some(now);
        Some(producer())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Wire shape shared by every sensor and status topic.
#[derive(Serialize)]
struct ValuePayload<'a> {
    value: &'a str,
}

/// One retained message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String<TOPIC_CAP>,
    pub payload: String<PAYLOAD_CAP>,
    pub retain: bool,
}

/// Values reported in one publish window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub moisture_pct: f32,
    pub climate: ClimateReading,
    pub actuator_on: bool,
}

impl TelemetryData {
    /// Build the outbound batch: temperature and humidity (only when the
    /// sensor produced a usable value), moisture, then the pump status.
    pub fn to_messages(&self, topics: &Topics) -> Vec<OutboundMessage, 4> {
        let mut out = Vec::new();

        let climate = [
            (topics.temperature(), self.climate.temperature_c),
            (topics.humidity(), self.climate.humidity_pct),
        ];
        for (topic, value) in climate {
            if let Some(v) = value.filter(|v| *v > MIN_PUBLISHABLE) {
                push_reading(&mut out, topic, v);
            }
        }
        push_reading(&mut out, topics.moisture(), self.moisture_pct);

        let status = if self.actuator_on { "on" } else { "off" };
        push(&mut out, topics.actual_status(), status);

        out
    }
}

fn push_reading(out: &mut Vec<OutboundMessage, 4>, topic: &str, value: f32) {
    let mut text: String<24> = String::new();
    if write!(text, "{:.1}", value).is_err() {
        warn!("Telemetry value {} does not fit, skipping {}", value, topic);
        return;
    }
    push(out, topic, &text);
}

fn push(out: &mut Vec<OutboundMessage, 4>, topic: &str, value: &str) {
    match encode(topic, value) {
        Some(msg) => {
            if out.push(msg).is_err() {
                warn!("Telemetry batch full, skipping {}", topic);
            }
        }
        None => warn!("Telemetry payload for {} exceeds buffer", topic),
    }
}

/// Encode `{"value":"<value>"}` for `topic`.
pub fn encode(topic: &str, value: &str) -> Option<OutboundMessage> {
    let json = serde_json::to_string(&ValuePayload { value }).ok()?;
    Some(OutboundMessage {
        topic: String::try_from(topic).ok()?,
        payload: String::try_from(json.as_str()).ok()?,
        retain: true,
    })
}
