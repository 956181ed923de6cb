//! H-bridge DC motor driver
//!
//! Two output pins select the bridge half that is driven:
//!
//! | A | B | motor     |
//! |---|---|-----------|
//! | 0 | 0 | coast     |
//! | 1 | 0 | forward   |
//! | 0 | 1 | backward  |
//! | 1 | 1 | never set |
//!
//! "1" is the active level of each pin, which is low for inverted pins.
//! The idle half is always released before the other half is driven, so
//! both inputs are never active at the same time.
//!
//! # Usage
//!
//! ```ignore
//! let mut motor = DcMotor::new(pin_a, pin_b, DcMotorConfig::from_pins(&config.pins));
//! motor.start(Direction::Forward)?;
//! motor.coast();
//! ```

use iris_core::config::PinConfig;
use iris_core::traits::{Direction, WheelMotor};
use iris_hal::OutputPin;

/// Motor driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Direction change requested while running; coast first
    DirectionChangeWhileRunning,
}

/// H-bridge wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DcMotorConfig {
    /// Swap the bridge halves (motor leads wired the other way round)
    pub reversed: bool,
    /// Input A is active low
    pub a_active_low: bool,
    /// Input B is active low
    pub b_active_low: bool,
}

impl DcMotorConfig {
    /// Wiring described by the pin configuration
    pub fn from_pins(pins: &PinConfig) -> Self {
        Self {
            reversed: pins.motor_reversed,
            a_active_low: pins.motor_a.inverted,
            b_active_low: pins.motor_b.inverted,
        }
    }
}

/// DC motor behind an H-bridge
pub struct DcMotor<A, B> {
    a: A,
    b: B,
    config: DcMotorConfig,
    /// Direction currently driven, `None` while coasting
    running: Option<Direction>,
}

impl<A: OutputPin, B: OutputPin> DcMotor<A, B> {
    /// Create a new driver; both inputs are released immediately
    pub fn new(a: A, b: B, config: DcMotorConfig) -> Self {
        let mut motor = Self {
            a,
            b,
            config,
            running: None,
        };
        motor.coast();
        motor
    }

    /// Get the wiring configuration
    pub fn config(&self) -> &DcMotorConfig {
        &self.config
    }

    /// Direction currently driven
    pub fn direction(&self) -> Option<Direction> {
        self.running
    }

    /// Start turning in `direction`
    ///
    /// Starting in the direction already driven is a no-op. Reversing
    /// while running is refused.
    pub fn start(&mut self, direction: Direction) -> Result<(), MotorError> {
        match self.running {
            Some(current) if current == direction => Ok(()),
            Some(_) => Err(MotorError::DirectionChangeWhileRunning),
            None => {
                self.drive(direction);
                Ok(())
            }
        }
    }

    /// Release both bridge inputs
    pub fn coast(&mut self) {
        self.set_a(false);
        self.set_b(false);
        self.running = None;
    }

    /// Give back the pins, coasting first
    pub fn release(mut self) -> (A, B) {
        self.coast();
        (self.a, self.b)
    }

    fn drive(&mut self, direction: Direction) {
        let physical = if self.config.reversed {
            direction.opposite()
        } else {
            direction
        };

        // Release before drive
        match physical {
            Direction::Forward => {
                self.set_b(false);
                self.set_a(true);
            }
            Direction::Backward => {
                self.set_a(false);
                self.set_b(true);
            }
        }
        self.running = Some(direction);
    }

    fn set_a(&mut self, active: bool) {
        self.a.set_state(active != self.config.a_active_low);
    }

    fn set_b(&mut self, active: bool) {
        self.b.set_state(active != self.config.b_active_low);
    }
}

impl<A: OutputPin, B: OutputPin> WheelMotor for DcMotor<A, B> {
    fn run(&mut self, direction: Direction) {
        if self.start(direction).is_err() {
            self.coast();
        }
    }

    fn stop(&mut self) {
        self.coast();
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }
}
