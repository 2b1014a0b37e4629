//! DHT22 (AM2302) temperature/humidity sensor driver.
//!
//! Single-wire, open-drain protocol bit-banged through `embedded-hal`
//! traits:
//!
//! ```text
//!  host ──low ≥1 ms──▶ release ─▶ sensor: 80 µs low, 80 µs high
//!  then 40 bits, each: 50 µs low + (26 µs high = 0 | 70 µs high = 1)
//!  frame: hum_hi hum_lo temp_hi temp_lo checksum
//! ```
//!
//! Humidity and temperature are tenths; bit 7 of `temp_hi` is the sign.
//! The sensor must not be polled faster than once every 2 s, which the
//! default control-loop interval already guarantees.
//!
//! A read preempted by the RTOS mid-frame fails the checksum or times out
//! and is simply retried on the next cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::{ClimateProbe, ClimateSample};
use crate::error::SensorError;

/// Host start pulse length.
const START_LOW_US: u32 = 1_100;
/// Upper bound for any single protocol phase.
const PHASE_TIMEOUT_US: u32 = 100;
/// Sample point after the rising edge of a data bit.
const BIT_SAMPLE_US: u32 = 35;

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must be configured open-drain with a pull-up.
    pub fn new(mut pin: P, delay: D) -> Self {
        // Idle bus is high; a failure here surfaces on the first read.
        let _ = pin.set_high();
        Self { pin, delay }
    }

    /// Perform one full transaction and return the raw 5-byte frame.
    pub fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;

        // Sensor response: pull low, release, pull low for the first bit.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; 5];
        for byte in &mut frame {
            for _ in 0..8 {
                self.wait_for(true)?;
                self.delay.delay_us(BIT_SAMPLE_US);
                let one = self.is_high()?;
                *byte = (*byte << 1) | u8::from(one);
                if one {
                    self.wait_for(false)?;
                }
            }
        }
        Ok(frame)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..PHASE_TIMEOUT_US {
            if self.is_high()? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }

    fn is_high(&mut self) -> Result<bool, SensorError> {
        self.pin.is_high().map_err(|_| SensorError::GpioFailed)
    }
}

impl<P, D> ClimateProbe for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        let frame = self.read_frame()?;
        decode(frame)
    }
}

/// Verify the checksum and convert a raw frame to engineering units.
pub fn decode(frame: [u8; 5]) -> Result<ClimateSample, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(ClimateSample {
        temperature_c: temperature,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}
