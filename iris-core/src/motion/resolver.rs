//! Sensor resolution
//!
//! Only the home slot has an absolute sensor. Every other slot is detected
//! by the shared proximity sensor, so "which sensor confirms slot N" is a
//! fixed mapping.

use crate::traits::{SensorId, SlotSensor};
use crate::Slot;

/// Owns both slot sensors and answers which one confirms a slot
pub struct SensorResolver<H, P> {
    home: H,
    proximity: P,
    home_slot: Slot,
}

impl<H: SlotSensor, P: SlotSensor> SensorResolver<H, P> {
    /// Create a resolver for a wheel whose home sensor sits at `home_slot`
    pub fn new(home: H, proximity: P, home_slot: Slot) -> Self {
        Self {
            home,
            proximity,
            home_slot,
        }
    }

    /// Sensor that confirms arrival at `slot`
    pub fn sensor_for(&self, slot: Slot) -> SensorId {
        if slot == self.home_slot {
            SensorId::Home
        } else {
            SensorId::Proximity
        }
    }

    /// Take one sample of `sensor`
    pub fn is_triggered(&mut self, sensor: SensorId) -> bool {
        match sensor {
            SensorId::Home => self.home.is_triggered(),
            SensorId::Proximity => self.proximity.is_triggered(),
        }
    }

    /// Slot carrying the home sensor
    pub fn home_slot(&self) -> Slot {
        self.home_slot
    }

    /// Give back the sensors
    pub fn release(self) -> (H, P) {
        (self.home, self.proximity)
    }
}
