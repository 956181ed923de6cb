//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in iris-core:
//!
//! - Motor drivers (H-bridge DC motor over two output pins)
//! - Slot sensors (digital input with selectable polarity)
//! - A simulated wheel for host tests and bench bring-up

#![no_std]
#![deny(unsafe_code)]

// proptest needs std on the host
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod motor;
pub mod sensor;
pub mod sim;
