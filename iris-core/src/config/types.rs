//! Configuration type definitions
//!
//! Everything the controller needs to know about the wheel is captured here
//! once at boot and never changes afterwards.

use crate::Slot;

use super::parse::ParseError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of slots on a wheel
pub const MAX_SLOTS: u8 = 16;

/// Slot count of the reference wheel
pub const DEFAULT_SLOT_COUNT: u8 = 5;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Source text could not be parsed
    Parse(ParseError),
    /// Slot count below 2 or above [`MAX_SLOTS`]
    InvalidSlotCount,
    /// Home slot outside `0..slot_count`
    InvalidHomeSlot,
    /// Zero poll interval or zero search step bound
    InvalidTiming,
    /// Retry policy with zero attempts
    InvalidRetryPolicy,
    /// Two functions assigned to the same pin
    PinConflict,
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Search timing
///
/// Worst-case duration of one search phase is
/// `max_search_steps * poll_interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Delay after starting the motor before the first sensor sample (ms)
    pub settle_ms: u32,
    /// Delay between sensor samples (ms)
    pub poll_interval_ms: u32,
    /// Samples taken before a search gives up
    pub max_search_steps: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 200,
            poll_interval_ms: 5,
            // 10 s per phase, enough for a full turn at the slowest gearing
            max_search_steps: 2000,
        }
    }
}

/// Pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinSpec {
    /// GPIO number
    pub pin: u8,
    /// Active-low
    pub inverted: bool,
}

impl PinSpec {
    /// Active-high pin
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Active-low pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Motor and sensor wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// H-bridge input A (driven for forward rotation)
    pub motor_a: PinSpec,
    /// H-bridge input B (driven for backward rotation)
    pub motor_b: PinSpec,
    /// Swap forward and backward, for motors wired the other way round
    pub motor_reversed: bool,
    /// Absolute home sensor
    pub home_sensor: PinSpec,
    /// Per-slot proximity sensor
    pub proximity_sensor: PinSpec,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            motor_a: PinSpec::new(10),
            motor_b: PinSpec::new(11),
            motor_reversed: false,
            // Open-collector hall/IR sensors pull low when triggered
            home_sensor: PinSpec::inverted(2),
            proximity_sensor: PinSpec::inverted(3),
        }
    }
}

impl PinConfig {
    /// Check that no pin is used twice
    pub fn has_conflict(&self) -> bool {
        let pins = [
            self.motor_a.pin,
            self.motor_b.pin,
            self.home_sensor.pin,
            self.proximity_sensor.pin,
        ];
        pins.iter()
            .enumerate()
            .any(|(i, p)| pins[i + 1..].contains(p))
    }
}

/// How the protocol session executes a `SETFILTER` command
///
/// Each command runs `attempts` consecutive moves to the same target. The
/// second pass corrects the slack a single coarse move leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetryPolicy {
    /// Moves per command
    pub attempts: u8,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 2 }
    }
}

impl RetryPolicy {
    /// One move per command
    pub const fn single() -> Self {
        Self { attempts: 1 }
    }
}

/// Complete wheel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WheelConfig {
    /// Number of slots
    pub slot_count: u8,
    /// Slot carrying the home sensor
    pub home_slot: Slot,
    /// Search timing
    pub timing: TimingConfig,
    /// Wiring
    pub pins: PinConfig,
    /// Protocol retry policy
    pub retry: RetryPolicy,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            home_slot: 0,
            timing: TimingConfig::default(),
            pins: PinConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl WheelConfig {
    /// Check the configuration for values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count < 2 || self.slot_count > MAX_SLOTS {
            return Err(ConfigError::InvalidSlotCount);
        }
        if self.home_slot >= self.slot_count {
            return Err(ConfigError::InvalidHomeSlot);
        }
        if self.timing.poll_interval_ms == 0 || self.timing.max_search_steps == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy);
        }
        if self.pins.has_conflict() {
            return Err(ConfigError::PinConflict);
        }
        Ok(())
    }
}
