//! Filter wheel trait
//!
//! The seam between the command session and whatever positions the wheel.
//! [`PositionController`](crate::motion::PositionController) is the real
//! implementation; tests substitute scripted wheels.

use crate::motion::MoveError;
use crate::Slot;

/// Snapshot of the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelStatus {
    /// Last confirmed slot (stale while `lost`)
    pub position: Slot,
    /// Position has not been confirmed by the last search
    pub lost: bool,
}

/// A wheel that can be moved to a slot
pub trait FilterWheel {
    /// Number of slots on the wheel
    fn slot_count(&self) -> u8;

    /// Current controller state
    fn status(&self) -> WheelStatus;

    /// Move to `target`, blocking until arrival or failure
    fn move_to(&mut self, target: Slot) -> Result<(), MoveError>;

    /// Last confirmed slot
    fn position(&self) -> Slot {
        self.status().position
    }

    /// Check if the position is unconfirmed
    fn is_lost(&self) -> bool {
        self.status().lost
    }
}
