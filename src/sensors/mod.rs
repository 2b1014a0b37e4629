//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns a soil probe and a climate probe and produces a
//! [`SensorSnapshot`] once per cycle.  Probes are traits so the hub runs
//! unchanged against ESP-IDF drivers on the device and closures in tests;
//! any `FnMut() -> Result<..>` is a probe.

pub mod dht22;
pub mod soil;

use log::warn;

use crate::error::SensorError;
use soil::{MoistureReading, SoilSensor};

// ---------------------------------------------------------------------------
// Probe traits
// ---------------------------------------------------------------------------

/// Source of raw 12-bit soil-moisture ADC samples.
pub trait SoilProbe {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

impl<F> SoilProbe for F
where
    F: FnMut() -> Result<u16, SensorError>,
{
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self()
    }
}

/// One raw temperature/humidity sample.  Either value may be NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Source of ambient temperature/humidity samples.
pub trait ClimateProbe {
    fn read(&mut self) -> Result<ClimateSample, SensorError>;
}

impl<F> ClimateProbe for F
where
    F: FnMut() -> Result<ClimateSample, SensorError>,
{
    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        self()
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Ambient temperature (°C) and relative humidity (%).
///
/// `None` means the sensor reported not-a-number or could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
}

impl ClimateReading {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_sample(sample: ClimateSample) -> Self {
        Self {
            temperature_c: finite(sample.temperature_c),
            humidity_pct: finite(sample.humidity_pct),
        }
    }

    /// Temperature with "unavailable" rendered as the 0.0 placeholder.
    pub fn temperature_or_zero(&self) -> f32 {
        self.temperature_c.unwrap_or(0.0)
    }

    /// Humidity with "unavailable" rendered as the 0.0 placeholder.
    pub fn humidity_or_zero(&self) -> f32 {
        self.humidity_pct.unwrap_or(0.0)
    }
}

fn finite(v: f32) -> Option<f32> {
    if v.is_finite() { Some(v) } else { None }
}

/// A point-in-time snapshot of every sensor, taken once per cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub moisture: MoistureReading,
    pub climate: ClimateReading,
}

// ---------------------------------------------------------------------------
// SensorHub
// ---------------------------------------------------------------------------

/// Aggregates the soil and climate probes and produces a unified snapshot.
pub struct SensorHub<S, C> {
    soil: SoilSensor<S>,
    climate: C,
    climate_ok: bool,
}

impl<S: SoilProbe, C: ClimateProbe> SensorHub<S, C> {
    pub fn new(soil: S, climate: C) -> Self {
        Self {
            soil: SoilSensor::new(soil),
            climate,
            climate_ok: true,
        }
    }

    /// Read every sensor and return a unified snapshot.
    ///
    /// Read failures never propagate: the soil sensor falls back to its last
    /// good value and the climate reading becomes unavailable.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let moisture = self.soil.read();

        let climate = match self.climate.read() {
            Ok(sample) => {
                self.climate_ok = true;
                ClimateReading::from_sample(sample)
            }
            Err(e) => {
                // Log only the first failure of a run to keep the console usable.
                if self.climate_ok {
                    warn!("Climate sensor read failed: {}", e);
                }
                self.climate_ok = false;
                ClimateReading::unavailable()
            }
        };

        SensorSnapshot { moisture, climate }
    }
}
