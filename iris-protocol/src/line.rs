//! Line framing for the command protocol.
//!
//! A line is every byte received since the previous delimiter, up to but not
//! including the next `#`. Lines longer than [`MAX_LINE_LEN`] cannot be a
//! valid command; the parser discards them up to the next delimiter so the
//! stream resynchronises on its own.

use heapless::Vec;

/// Line terminator
pub const DELIMITER: u8 = b'#';

/// Longest line the parser will buffer
///
/// `SETFILTER` plus an `i32` with sign fits comfortably.
pub const MAX_LINE_LEN: usize = 32;

/// A complete line, delimiter stripped
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Errors reported while framing lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`]; bytes up to the next delimiter are dropped
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Accumulating line bytes
    Collecting,
    /// Dropping an oversized line until the next delimiter
    Discarding,
}

/// Byte-at-a-time line parser
#[derive(Debug, Clone)]
pub struct LineParser {
    state: ParseState,
    buffer: Line,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.state = ParseState::Collecting;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(line))` when a delimiter completes a line,
    /// `Ok(None)` when more bytes are needed, and `Err(Overflow)` once for
    /// each line that outgrows the buffer.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match self.state {
            ParseState::Collecting => {
                if byte == DELIMITER {
                    let line = core::mem::take(&mut self.buffer);
                    return Ok(Some(line));
                }
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = ParseState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
            ParseState::Discarding => {
                if byte == DELIMITER {
                    self.state = ParseState::Collecting;
                }
                Ok(None)
            }
        }
    }
}
