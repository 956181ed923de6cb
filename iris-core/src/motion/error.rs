//! Move errors

/// Reasons a move or slot search did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveError {
    /// Requested slot does not exist; nothing was moved
    InvalidTarget,
    /// The wheel was lost and could not find the home slot
    HomingFailed,
    /// A slot search gave up before its sensor triggered
    SearchTimeout,
}

impl MoveError {
    /// Check if the error leaves the controller lost
    pub fn leaves_lost(&self) -> bool {
        matches!(self, MoveError::HomingFailed | MoveError::SearchTimeout)
    }
}
