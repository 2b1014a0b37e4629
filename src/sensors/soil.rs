//! Capacitive soil-moisture probe.
//!
//! The probe output voltage falls as the soil gets wetter, so the 12-bit
//! ADC range maps inverted onto 0–100 %: raw 0 is saturated soil, raw 4095
//! is dry air.  The mapping uses integer arithmetic and truncation so the
//! percentage is always a whole number.

use log::warn;

use super::SoilProbe;

/// Full-scale value of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;

/// Soil moisture as a percentage, always in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct MoistureReading(f32);

impl MoistureReading {
    /// Clamp `percent` into `[0, 100]`.  NaN becomes 0.
    pub fn new(percent: f32) -> Self {
        if percent.is_nan() {
            return Self(0.0);
        }
        Self(percent.clamp(0.0, 100.0))
    }

    /// Convert a raw ADC sample.
    pub fn from_adc(raw: u16) -> Self {
        let drop = u32::from(raw) * 100 / u32::from(ADC_MAX);
        let percent = (100 - drop as i32).clamp(0, 100);
        Self(percent as f32)
    }

    pub fn percent(self) -> f32 {
        self.0
    }

    /// Strictly below a whole-percent threshold.
    pub fn is_below(self, threshold: u8) -> bool {
        self.0 < f32::from(threshold)
    }

    /// Strictly above a whole-percent threshold.
    pub fn is_above(self, threshold: u8) -> bool {
        self.0 > f32::from(threshold)
    }
}

/// Soil sensor with last-good-value fallback.
pub struct SoilSensor<P> {
    probe: P,
    last: MoistureReading,
    failing: bool,
}

impl<P: SoilProbe> SoilSensor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            last: MoistureReading::default(),
            failing: false,
        }
    }

    /// Sample the probe.  On failure the previous good reading is returned
    /// (0 % before the first success).
    pub fn read(&mut self) -> MoistureReading {
        match self.probe.read_raw() {
            Ok(raw) => {
                self.failing = false;
                self.last = MoistureReading::from_adc(raw);
            }
            Err(e) => {
                if !self.failing {
                    warn!("Soil ADC read failed ({}), holding {:.0}%", e, self.last.percent());
                }
                self.failing = true;
            }
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;

    #[test]
    fn adc_extremes_map_inverted() {
        assert_eq!(MoistureReading::from_adc(0).percent(), 100.0);
        assert_eq!(MoistureReading::from_adc(ADC_MAX).percent(), 0.0);
    }

    #[test]
    fn adc_midscale_truncates() {
        assert_eq!(MoistureReading::from_adc(2048).percent(), 50.0);
        // 1 LSB is not enough to lose a whole percent.
        assert_eq!(MoistureReading::from_adc(1).percent(), 100.0);
        assert_eq!(MoistureReading::from_adc(40).percent(), 100.0);
        assert_eq!(MoistureReading::from_adc(41).percent(), 99.0);
    }

    #[test]
    fn out_of_range_adc_clamps_to_dry() {
        assert_eq!(MoistureReading::from_adc(u16::MAX).percent(), 0.0);
    }

    #[test]
    fn constructor_clamps() {
        assert_eq!(MoistureReading::new(-5.0).percent(), 0.0);
        assert_eq!(MoistureReading::new(140.0).percent(), 100.0);
        assert_eq!(MoistureReading::new(f32::NAN).percent(), 0.0);
    }

    #[test]
    fn threshold_comparisons_are_strict() {
        let m = MoistureReading::new(40.0);
        assert!(!m.is_below(40));
        assert!(!m.is_above(40));
        assert!(m.is_below(41));
        assert!(m.is_above(39));
    }

    #[test]
    fn failed_read_holds_last_good_value() {
        let mut samples = [
            Ok::<u16, SensorError>(2048),
            Err(SensorError::AdcReadFailed),
            Ok(0),
        ]
        .into_iter();
        let mut sensor = SoilSensor::new(move || samples.next().unwrap_or(Ok(0)));

        assert_eq!(sensor.read().percent(), 50.0);
        assert_eq!(sensor.read().percent(), 50.0);
        assert_eq!(sensor.read().percent(), 100.0);
    }
}
