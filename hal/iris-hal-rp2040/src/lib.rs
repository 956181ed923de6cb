//! RP2040-specific HAL for the filter wheel firmware
//!
//! This crate provides RP2040 implementations of the shared `iris-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - Pin lookup by number for config-driven wiring
//! - GPIO adapters for the motor bridge and slot sensors
//! - Blocking UART for the command protocol

#![no_std]

pub mod gpio;
pub mod pins;
pub mod uart;

pub use gpio::{RpInput, RpOutput};
pub use pins::{PinBank, PinError, SerialPeripherals};
pub use uart::RpUart;
