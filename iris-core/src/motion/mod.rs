//! Wheel positioning
//!
//! Sensor resolution, direction planning and the slot-by-slot position
//! controller built on top of them.

pub mod controller;
pub mod error;
pub mod planner;
pub mod resolver;

pub use controller::{PositionController, HOMING_DIRECTION};
pub use error::MoveError;
pub use planner::{plan, Plan};
pub use resolver::SensorResolver;
