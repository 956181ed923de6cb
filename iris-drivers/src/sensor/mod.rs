//! Slot sensor implementations

pub mod digital;

pub use digital::DigitalSensor;
