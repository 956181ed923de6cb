//! Digital slot sensor
//!
//! Hall, reed and open-collector proximity sensors all present as a single
//! digital input. Open-collector parts pull the line low when a mark is in
//! front of them, so polarity is selectable.

use iris_core::config::PinSpec;
use iris_core::traits::SlotSensor;
use iris_hal::InputPin;

/// Slot sensor over one input pin
pub struct DigitalSensor<P> {
    pin: P,
    /// If true, triggered = pin LOW
    active_low: bool,
}

impl<P: InputPin> DigitalSensor<P> {
    /// Create a sensor
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Create a sensor that triggers on a high level
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a sensor that triggers on a low level
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Create a sensor with the polarity given by its pin spec
    pub fn from_spec(pin: P, spec: &PinSpec) -> Self {
        Self::new(pin, spec.inverted)
    }

    /// Check if the sensor triggers on a low level
    pub fn is_active_low(&self) -> bool {
        self.active_low
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> SlotSensor for DigitalSensor<P> {
    fn is_triggered(&mut self) -> bool {
        self.pin.is_high() != self.active_low
    }
}
