//! Direction planning
//!
//! The wheel is cyclic, so every target can be reached both ways round.
//! Each intermediate slot costs one confirmed search, so the planner picks
//! the direction with fewer slots to cross.

use crate::traits::Direction;
use crate::Slot;

/// Travel plan for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plan {
    /// Direction of travel
    pub direction: Direction,
    /// Number of slot boundaries to cross (0 = stay and re-confirm)
    pub steps: u8,
}

/// Plan the shortest route from `current` to `target` on a wheel of
/// `slot_count` slots
///
/// With `d` the forward distance, travel is backward `slot_count - d` steps
/// when `2 * d > slot_count`, otherwise forward `d` steps. A tie on an even
/// wheel keeps forward.
pub fn plan(current: Slot, target: Slot, slot_count: u8) -> Plan {
    let n = slot_count as u16;
    let d = (target as u16 + n - (current as u16 % n)) % n;

    if 2 * d > n {
        Plan {
            direction: Direction::Backward,
            steps: (n - d) as u8,
        }
    } else {
        Plan {
            direction: Direction::Forward,
            steps: d as u8,
        }
    }
}
