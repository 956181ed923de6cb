//! Board-agnostic core logic for the filter wheel firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motor, slot sensor, wheel)
//! - Configuration types and the config file parser
//! - Slot sensor resolution and direction planning
//! - The position controller (homing, slot search, moves)
//! - The command session that serves the serial protocol

#![no_std]
#![deny(unsafe_code)]

// proptest needs std on the host
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod motion;
pub mod session;
pub mod traits;

/// Logical slot index, `0..slot_count`
pub type Slot = u8;
