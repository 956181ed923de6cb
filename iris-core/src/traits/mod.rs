//! Hardware abstraction traits
//!
//! These traits define the interface between the positioning logic
//! and hardware-specific (or simulated) implementations.

pub mod motor;
pub mod sensor;
pub mod wheel;

pub use motor::{Direction, WheelMotor};
pub use sensor::{SensorId, SlotSensor};
pub use wheel::{FilterWheel, WheelStatus};
