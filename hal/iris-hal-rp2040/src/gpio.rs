//! GPIO adapters
//!
//! Wrap embassy-rp pins in the `iris-hal` traits. Pins are built from a
//! [`PinSpec`] so the idle level and pull follow the configured polarity:
//! an inverted output idles high, an inverted (active low) input gets a
//! pull-up for open-collector sensors.

use embassy_rp::gpio::{Input, Level, Output, Pull};
use iris_core::config::PinSpec;
use iris_hal::{InputPin, OutputPin};

use crate::pins::{PinBank, PinError};

/// Push-pull output
pub struct RpOutput {
    pin: Output<'static>,
}

impl RpOutput {
    /// Take the pin named by `spec` from `bank`, driven to its inactive level
    pub fn from_spec(bank: &mut PinBank, spec: &PinSpec) -> Result<Self, PinError> {
        let pin = bank.take(spec.pin)?;
        Ok(Self {
            pin: Output::new(pin, Level::from(spec.inverted)),
        })
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Digital input
pub struct RpInput {
    pin: Input<'static>,
}

impl RpInput {
    /// Take the pin named by `spec` from `bank`, pulled to its inactive level
    pub fn from_spec(bank: &mut PinBank, spec: &PinSpec) -> Result<Self, PinError> {
        let pin = bank.take(spec.pin)?;
        let pull = if spec.inverted { Pull::Up } else { Pull::Down };
        Ok(Self {
            pin: Input::new(pin, pull),
        })
    }
}

impl InputPin for RpInput {
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}
