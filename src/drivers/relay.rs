//! Pump relay driver.
//!
//! Active-high relay module on a single GPIO: high energises the pump,
//! low releases it.  The pin is driven low at construction so the pump is
//! off from the first instant the firmware owns it.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`]: on ESP-IDF this is a
//! `PinDriver<Output>`; on host/test it is any mock pin.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct RelayDriver<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set(false)
    }

    /// Last level successfully written.
    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct MockPin {
        high: Option<bool>,
        writes: usize,
        broken: bool,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for MockPin {
        type Error = PinFault;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = Some(false);
            self.writes += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = Some(true);
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn starts_released() {
        let relay = RelayDriver::new(MockPin::default()).unwrap();
        assert!(!relay.is_on());
        assert_eq!(relay.pin.high, Some(false));
    }

    #[test]
    fn follows_commands() {
        let mut relay = RelayDriver::new(MockPin::default()).unwrap();
        relay.set(true).unwrap();
        assert!(relay.is_on());
        assert_eq!(relay.pin.high, Some(true));
        relay.off().unwrap();
        assert!(!relay.is_on());
        assert_eq!(relay.pin.writes, 3);
    }

    #[test]
    fn gpio_failure_is_reported_and_state_kept() {
        let mut relay = RelayDriver::new(MockPin::default()).unwrap();
        relay.pin.broken = true;
        assert_eq!(relay.set(true), Err(ActuatorError::GpioWriteFailed));
        assert!(!relay.is_on());
    }

    #[test]
    fn infallible_pins_work() {
        struct Ideal;
        impl ErrorType for Ideal {
            type Error = Infallible;
        }
        impl OutputPin for Ideal {
            fn set_low(&mut self) -> Result<(), Infallible> {
                Ok(())
            }
            fn set_high(&mut self) -> Result<(), Infallible> {
                Ok(())
            }
        }
        let mut relay = RelayDriver::new(Ideal).unwrap();
        assert!(relay.set(true).is_ok());
    }
}
