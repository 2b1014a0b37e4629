//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the [`RelayDriver`], exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  Generic over the probe and pin
//! types, so the same adapter drives ESP-IDF peripherals on the device and
//! closures / mock pins on the host.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::error::ActuatorError;
use crate::sensors::{ClimateProbe, SensorHub, SensorSnapshot, SoilProbe};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, C, P> {
    sensor_hub: SensorHub<S, C>,
    relay: RelayDriver<P>,
}

impl<S, C, P> HardwareAdapter<S, C, P>
where
    S: SoilProbe,
    C: ClimateProbe,
    P: OutputPin,
{
    pub fn new(sensor_hub: SensorHub<S, C>, relay: RelayDriver<P>) -> Self {
        Self { sensor_hub, relay }
    }

    pub fn relay_on(&self) -> bool {
        self.relay.is_on()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S, C, P> SensorPort for HardwareAdapter<S, C, P>
where
    S: SoilProbe,
    C: ClimateProbe,
    P: OutputPin,
{
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S, C, P> ActuatorPort for HardwareAdapter<S, C, P>
where
    S: SoilProbe,
    C: ClimateProbe,
    P: OutputPin,
{
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay.set(on)
    }

    fn all_off(&mut self) {
        if let Err(e) = self.relay.off() {
            warn!("Relay release failed: {}", e);
        }
    }
}
