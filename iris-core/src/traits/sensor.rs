//! Slot sensor trait

/// Physical sensors on the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorId {
    /// Absolute sensor, only present at the home slot
    Home,
    /// Sensor that fires at every slot
    Proximity,
}

/// Digital sensor that reports whether a slot mark is in front of it
pub trait SlotSensor {
    /// Take one sample
    ///
    /// A single sample is authoritative for a poll tick; filtering comes
    /// from the caller's fixed polling cadence.
    fn is_triggered(&mut self) -> bool;
}

impl<T: SlotSensor + ?Sized> SlotSensor for &mut T {
    fn is_triggered(&mut self) -> bool {
        (**self).is_triggered()
    }
}
