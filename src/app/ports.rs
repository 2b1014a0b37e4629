//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, relay, display, broker link, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use heapless::String;

use crate::error::{ActuatorError, CommsError};
use crate::sensors::SensorSnapshot;
use crate::store::mode::Mode;
use crate::store::rules::PLANT_NAME_CAP;
use crate::telemetry::OutboundMessage;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Read every sensor and return a unified snapshot.  Never fails;
    /// unavailable values are represented inside the snapshot.
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the pump relay.
pub trait ActuatorPort {
    /// Energise (`true`) or release (`false`) the pump relay.
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Release every actuator for a safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// What the local display shows for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub plant_name: String<PLANT_NAME_CAP>,
    pub mode: Mode,
    /// Unavailable temperature is rendered as 0.0.
    pub temperature_c: f32,
    pub moisture_pct: f32,
    pub threshold: u8,
    pub actuator_on: bool,
}

pub trait DisplayPort {
    fn render(&mut self, frame: &DisplayFrame);

    /// Show or hide the low-moisture alert.  Blinking is up to the adapter.
    fn render_alert(&mut self, active: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

pub trait TelemetryPort {
    fn is_connected(&self) -> bool;

    /// Fire-and-forget publish.  No retry on failure.
    fn publish(&mut self, msg: &OutboundMessage) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
