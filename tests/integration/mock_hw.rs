//! Mock adapters for integration tests.
//!
//! Each mock records every call so tests can assert on the full history
//! without touching real GPIO or a broker.

use siramin::app::events::AppEvent;
use siramin::app::ports::{
    ActuatorPort, DisplayFrame, DisplayPort, EventSink, SensorPort, TelemetryPort,
};
use siramin::error::{ActuatorError, CommsError};
use siramin::sensors::soil::MoistureReading;
use siramin::sensors::{ClimateReading, ClimateSample, SensorSnapshot};
use siramin::telemetry::OutboundMessage;

// ── MockHw ────────────────────────────────────────────────────

/// Sensors return whatever the test set last; relay writes are recorded.
pub struct MockHw {
    pub moisture: f32,
    pub climate: ClimateReading,
    pub relay: Vec<bool>,
    pub all_off_calls: usize,
    pub fail_relay: bool,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new(moisture: f32) -> Self {
        Self {
            moisture,
            climate: ClimateReading::from_sample(ClimateSample {
                temperature_c: 27.5,
                humidity_pct: 61.0,
            }),
            relay: Vec::new(),
            all_off_calls: 0,
            fail_relay: false,
        }
    }

    pub fn relay_on(&self) -> bool {
        self.relay.last().copied().unwrap_or(false)
    }
}

impl SensorPort for MockHw {
    fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            moisture: MoistureReading::new(self.moisture),
            climate: self.climate,
        }
    }
}

impl ActuatorPort for MockHw {
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_relay {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.relay.push(on);
        Ok(())
    }

    fn all_off(&mut self) {
        self.all_off_calls += 1;
        self.relay.push(false);
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<DisplayFrame>,
    pub alerts: Vec<bool>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        self.frames.push(frame.clone());
    }

    fn render_alert(&mut self, active: bool) {
        self.alerts.push(active);
    }
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub connected: bool,
    pub fail_publish: bool,
    pub published: Vec<OutboundMessage>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn connected() -> Self {
        Self {
            connected: true,
            fail_publish: false,
            published: Vec::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            ..Self::connected()
        }
    }

    pub fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|m| m.topic.as_str()).collect()
    }
}

impl TelemetryPort for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, msg: &OutboundMessage) -> Result<(), CommsError> {
        if self.fail_publish {
            return Err(CommsError::MqttPublishFailed);
        }
        self.published.push(msg.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
