//! Commands sent by the host
//!
//! Only two commands exist. Both are matched byte-for-byte against the line
//! contents; the slot argument of `SETFILTER` is a signed decimal integer so
//! out-of-range requests still decode and can be rejected by the controller.

use heapless::Vec;

use crate::line::{DELIMITER, MAX_LINE_LEN};

const GET_FILTER: &[u8] = b"GETFILTER";
const SET_FILTER: &[u8] = b"SETFILTER";

/// Reasons a line is not a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line does not start with a known command word
    Unknown,
    /// `SETFILTER` without any digits
    MissingArgument,
    /// `SETFILTER` argument is not a decimal integer
    InvalidArgument,
    /// `SETFILTER` argument does not fit in an `i32`
    ArgumentOverflow,
}

/// Host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Report the last known slot without moving
    GetFilter,
    /// Move to the given slot
    SetFilter(i32),
}

impl Command {
    /// Decode a command from a line (delimiter already stripped)
    pub fn parse(line: &[u8]) -> Result<Self, CommandError> {
        if line == GET_FILTER {
            return Ok(Command::GetFilter);
        }

        if let Some(arg) = line.strip_prefix(SET_FILTER) {
            return parse_decimal(arg).map(Command::SetFilter);
        }

        Err(CommandError::Unknown)
    }

    /// Encode this command including its delimiter (host side and tests)
    pub fn encode(&self) -> Vec<u8, MAX_LINE_LEN> {
        let mut out = Vec::new();
        // Longest encoding is SETFILTER-2147483648# which fits
        match self {
            Command::GetFilter => {
                let _ = out.extend_from_slice(GET_FILTER);
            }
            Command::SetFilter(slot) => {
                let _ = out.extend_from_slice(SET_FILTER);
                let mut digits = [0u8; 11];
                let len = format_i32(*slot, &mut digits);
                let _ = out.extend_from_slice(&digits[..len]);
            }
        }
        let _ = out.push(DELIMITER);
        out
    }
}

/// Parse an optionally signed decimal integer that spans the whole slice
fn parse_decimal(arg: &[u8]) -> Result<i32, CommandError> {
    let (negative, digits) = match arg.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, arg),
    };

    if digits.is_empty() {
        return Err(CommandError::MissingArgument);
    }

    // Accumulate negatively so i32::MIN is representable
    let mut value: i32 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(CommandError::InvalidArgument);
        }
        let digit = (b - b'0') as i32;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_sub(digit))
            .ok_or(CommandError::ArgumentOverflow)?;
    }

    if negative {
        Ok(value)
    } else {
        value.checked_neg().ok_or(CommandError::ArgumentOverflow)
    }
}

/// Write the decimal form of `value` into `buf`, returning its length
pub(crate) fn format_i32(value: i32, buf: &mut [u8; 11]) -> usize {
    let mut tmp = [0u8; 11];
    let mut n = 0;
    // Work on the magnitude as u32 so i32::MIN does not overflow
    let mut magnitude = value.unsigned_abs();
    loop {
        tmp[n] = b'0' + (magnitude % 10) as u8;
        n += 1;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }

    let mut len = 0;
    if value < 0 {
        buf[0] = b'-';
        len = 1;
    }
    for i in (0..n).rev() {
        buf[len] = tmp[i];
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_filter() {
        assert_eq!(Command::parse(b"GETFILTER"), Ok(Command::GetFilter));
    }

    #[test]
    fn test_parse_set_filter() {
        assert_eq!(Command::parse(b"SETFILTER2"), Ok(Command::SetFilter(2)));
        assert_eq!(Command::parse(b"SETFILTER0"), Ok(Command::SetFilter(0)));
        assert_eq!(Command::parse(b"SETFILTER9"), Ok(Command::SetFilter(9)));
        assert_eq!(Command::parse(b"SETFILTER-1"), Ok(Command::SetFilter(-1)));
        assert_eq!(Command::parse(b"SETFILTER+3"), Ok(Command::SetFilter(3)));
        assert_eq!(Command::parse(b"SETFILTER007"), Ok(Command::SetFilter(7)));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(Command::parse(b"getfilter"), Err(CommandError::Unknown));
        assert_eq!(Command::parse(b"SetFilter1"), Err(CommandError::Unknown));
    }

    #[test]
    fn test_parse_rejects_trailing_bytes() {
        assert_eq!(Command::parse(b"GETFILTER "), Err(CommandError::Unknown));
        assert_eq!(Command::parse(b"\nGETFILTER"), Err(CommandError::Unknown));
        assert_eq!(
            Command::parse(b"SETFILTER2x"),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            Command::parse(b"SETFILTER 2"),
            Err(CommandError::InvalidArgument)
        );
    }

    #[test]
    fn test_parse_missing_argument() {
        assert_eq!(
            Command::parse(b"SETFILTER"),
            Err(CommandError::MissingArgument)
        );
        assert_eq!(
            Command::parse(b"SETFILTER-"),
            Err(CommandError::MissingArgument)
        );
    }

    #[test]
    fn test_parse_argument_bounds() {
        assert_eq!(
            Command::parse(b"SETFILTER2147483647"),
            Ok(Command::SetFilter(i32::MAX))
        );
        assert_eq!(
            Command::parse(b"SETFILTER-2147483648"),
            Ok(Command::SetFilter(i32::MIN))
        );
        assert_eq!(
            Command::parse(b"SETFILTER2147483648"),
            Err(CommandError::ArgumentOverflow)
        );
        assert_eq!(
            Command::parse(b"SETFILTER99999999999"),
            Err(CommandError::ArgumentOverflow)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Command::parse(b""), Err(CommandError::Unknown));
        assert_eq!(Command::parse(b"HOME"), Err(CommandError::Unknown));
    }

    #[test]
    fn test_encode() {
        assert_eq!(&Command::GetFilter.encode()[..], b"GETFILTER#");
        assert_eq!(&Command::SetFilter(4).encode()[..], b"SETFILTER4#");
        assert_eq!(&Command::SetFilter(-12).encode()[..], b"SETFILTER-12#");
        assert_eq!(
            &Command::SetFilter(i32::MIN).encode()[..],
            b"SETFILTER-2147483648#"
        );
    }

    #[test]
    fn test_encoded_command_parses_back() {
        for cmd in [Command::GetFilter, Command::SetFilter(3), Command::SetFilter(-7)] {
            let bytes = cmd.encode();
            let line = &bytes[..bytes.len() - 1];
            assert_eq!(Command::parse(line), Ok(cmd));
        }
    }
}
