//! Wheel motor trait
//!
//! The wheel is turned by a plain DC motor with no feedback. The controller
//! only ever asks it to run in a direction or to stop.

use crate::Slot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wheel rotation direction
///
/// Forward increases the slot index, wrapping from the last slot to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Towards higher slot indices
    Forward,
    /// Towards lower slot indices
    Backward,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// The slot reached by moving one position in this direction
    ///
    /// `slot_count` must be non-zero.
    pub fn step(self, slot: Slot, slot_count: u8) -> Slot {
        match self {
            Direction::Forward => {
                if slot >= slot_count.saturating_sub(1) {
                    0
                } else {
                    slot + 1
                }
            }
            Direction::Backward => {
                if slot == 0 {
                    slot_count - 1
                } else {
                    slot - 1
                }
            }
        }
    }
}

/// Motor driving the wheel
pub trait WheelMotor {
    /// Start (or keep) turning in the given direction
    ///
    /// Callers stop the motor before reversing. A reversal requested while
    /// running is refused and leaves the motor stopped, never turning the
    /// old way.
    fn run(&mut self, direction: Direction);

    /// Stop turning
    fn stop(&mut self);

    /// Check if the motor is currently driven
    fn is_running(&self) -> bool;
}
