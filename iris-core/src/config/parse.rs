//! Simple TOML parser for wheel configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the wheel configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...), whole-line and trailing
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings and escapes
//! - Dotted keys
//!
//! Keys that are omitted keep their default value. The parsed result is
//! validated before it is returned.

use super::types::{ConfigError, PinSpec, WheelConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in the current section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    MalformedLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Pin string is not `gpioN` / `!gpioN`
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Wheel,
    Timing,
    Pins,
    Protocol,
}

/// Parsed right-hand side of `key = value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value<'a> {
    Integer(u32),
    Bool(bool),
    Str(&'a str),
}

impl<'a> Value<'a> {
    fn as_u32(self) -> Result<u32, ParseError> {
        match self {
            Value::Integer(v) => Ok(v),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_u8(self) -> Result<u8, ParseError> {
        u8::try_from(self.as_u32()?).map_err(|_| ParseError::InvalidValue)
    }

    fn as_bool(self) -> Result<bool, ParseError> {
        match self {
            Value::Bool(v) => Ok(v),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_pin(self) -> Result<PinSpec, ParseError> {
        match self {
            Value::Str(s) => parse_pin_string(s).ok_or(ParseError::InvalidPin),
            _ => Err(ParseError::InvalidValue),
        }
    }
}

/// Parse TOML configuration into a validated [`WheelConfig`]
pub fn parse_config(input: &str) -> Result<WheelConfig, ConfigError> {
    let mut config = WheelConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(name.trim())?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::MalformedLine)?;
        let key = key.trim();
        let value = parse_value(value.trim())?;

        apply_key(&mut config, section, key, value)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name {
        "wheel" => Ok(Section::Wheel),
        "timing" => Ok(Section::Timing),
        "pins" => Ok(Section::Pins),
        "protocol" => Ok(Section::Protocol),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_key(
    config: &mut WheelConfig,
    section: Section,
    key: &str,
    value: Value<'_>,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Wheel, "slot_count") => config.slot_count = value.as_u8()?,
        (Section::Wheel, "home_slot") => config.home_slot = value.as_u8()?,

        (Section::Timing, "settle_ms") => config.timing.settle_ms = value.as_u32()?,
        (Section::Timing, "poll_interval_ms") => {
            config.timing.poll_interval_ms = value.as_u32()?
        }
        (Section::Timing, "max_search_steps") => {
            config.timing.max_search_steps = value.as_u32()?
        }

        (Section::Pins, "motor_a") => config.pins.motor_a = value.as_pin()?,
        (Section::Pins, "motor_b") => config.pins.motor_b = value.as_pin()?,
        (Section::Pins, "motor_reversed") => config.pins.motor_reversed = value.as_bool()?,
        (Section::Pins, "home_sensor") => config.pins.home_sensor = value.as_pin()?,
        (Section::Pins, "proximity_sensor") => {
            config.pins.proximity_sensor = value.as_pin()?
        }

        (Section::Protocol, "retry_attempts") => config.retry.attempts = value.as_u8()?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing `# comment`, leaving `#` inside quoted strings alone
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_value(s: &str) -> Result<Value<'_>, ParseError> {
    if let Some(rest) = s.strip_prefix('"') {
        let inner = rest.strip_suffix('"').ok_or(ParseError::InvalidValue)?;
        if inner.contains('"') {
            return Err(ParseError::InvalidValue);
        }
        return Ok(Value::Str(inner));
    }

    match s {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    // TOML allows underscores as digit separators
    let mut value: u32 = 0;
    let mut digits = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(c as u32 - '0' as u32))
                    .ok_or(ParseError::InvalidValue)?;
                digits += 1;
            }
            '_' if digits > 0 => {}
            _ => return Err(ParseError::InvalidValue),
        }
    }
    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(Value::Integer(value))
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio11" -> pin 11, active-high
/// - "!gpio12" -> pin 12, active-low
pub fn parse_pin_string(s: &str) -> Option<PinSpec> {
    let s = s.trim();

    let (s, inverted) = match s.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let num_str = s.strip_prefix("gpio")?;
    if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pin: u8 = num_str.parse().ok()?;

    Some(PinSpec { pin, inverted })
}
