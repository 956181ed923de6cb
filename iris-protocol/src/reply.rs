//! Replies sent by the wheel

use heapless::Vec;

use crate::command::format_i32;
use crate::line::DELIMITER;

/// Longest reply: a three digit slot and the delimiter
pub const MAX_REPLY_LEN: usize = 4;

/// Wheel reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Current (or last known) slot, sent for both commands and at boot
    Position(u8),
}

impl Reply {
    /// Encode this reply including its delimiter
    pub fn encode(&self) -> Vec<u8, MAX_REPLY_LEN> {
        let mut out = Vec::new();
        match self {
            Reply::Position(slot) => {
                let mut digits = [0u8; 11];
                let len = format_i32(*slot as i32, &mut digits);
                let _ = out.extend_from_slice(&digits[..len]);
            }
        }
        let _ = out.push(DELIMITER);
        out
    }

    /// Decode a reply line (host side and tests)
    pub fn parse(line: &[u8]) -> Option<Self> {
        if line.is_empty() || line.len() > 3 || !line.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let value = line
            .iter()
            .fold(0u16, |acc, &b| acc * 10 + (b - b'0') as u16);
        u8::try_from(value).ok().map(Reply::Position)
    }
}
