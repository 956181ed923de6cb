//! Motor driver implementations
//!
//! The wheel is turned by a brushed DC motor behind an H-bridge. Speed is
//! fixed; only direction and run/stop are controlled.

pub mod hbridge;

pub use hbridge::{DcMotor, DcMotorConfig, MotorError};
