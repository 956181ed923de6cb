//! Simulated filter wheel
//!
//! A deterministic model of the wheel mechanics for host tests and bench
//! bring-up without hardware. Time only advances through [`SimDelay`], and
//! the wheel only turns while the motor is driven, so a full move replays
//! exactly the same way every run.
//!
//! The wheel circumference is `slot_count * ticks_per_slot` ticks. Slot `n`
//! has its mark at tick `n * ticks_per_slot`. A sensor reads triggered while
//! a mark it sees is within `window` ticks of the sensor:
//!
//! - the home sensor sees only the home slot mark
//! - the proximity sensor sees every slot mark
//!
//! All handles borrow the same [`SimWheel`], so they can be handed to a
//! [`PositionController`](iris_core::motion::PositionController) as
//! independent motor, sensors and delay. The motor can either be driven
//! directly through [`SimMotor`] or through the two bridge input pins, so
//! the real [`DcMotor`](crate::motor::DcMotor) and
//! [`DigitalSensor`](crate::sensor::DigitalSensor) drivers can be tested
//! against the model.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use iris_core::config::WheelConfig;
use iris_core::traits::{Direction, SensorId, SlotSensor, WheelMotor};
use iris_core::Slot;
use iris_hal::{InputPin, OutputPin};

/// Wheel geometry and speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimConfig {
    /// Number of slots
    pub slot_count: u8,
    /// Slot whose mark the home sensor sees
    pub home_slot: Slot,
    /// Ticks between two slot marks
    pub ticks_per_slot: u32,
    /// Ticks either side of a mark where its sensor triggers
    pub window: u32,
    /// Ticks travelled per millisecond while the motor runs
    pub ticks_per_ms: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            slot_count: 5,
            home_slot: 0,
            ticks_per_slot: 100,
            window: 5,
            ticks_per_ms: 1,
        }
    }
}

impl SimConfig {
    /// Geometry matching a wheel configuration
    pub fn for_wheel(config: &WheelConfig) -> Self {
        Self {
            slot_count: config.slot_count,
            home_slot: config.home_slot,
            ..Self::default()
        }
    }
}

/// Injected sensor failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    /// Always reads triggered
    Stuck,
    /// Never reads triggered (disconnected or missing)
    Dead,
}

/// Bridge inputs, active high
const A: usize = 0;
const B: usize = 1;

struct SimState {
    angle: u32,
    bridge: [bool; 2],
    pending_ns: u64,
    elapsed_ns: u64,
    travel: [u64; 2],
    motor_starts: u32,
    refused_reversals: u32,
    shoot_through: u32,
    home_fault: Option<SensorFault>,
    proximity_fault: Option<SensorFault>,
}

impl SimState {
    fn direction(&self) -> Option<Direction> {
        match self.bridge {
            [true, false] => Some(Direction::Forward),
            [false, true] => Some(Direction::Backward),
            _ => None,
        }
    }

    fn set_bridge(&mut self, input: usize, level: bool) {
        let was_running = self.direction().is_some();
        self.bridge[input] = level;
        if self.bridge == [true, true] {
            self.shoot_through += 1;
        }
        if !was_running && self.direction().is_some() {
            self.motor_starts += 1;
        }
    }
}

/// Simulated wheel shared by all handles
pub struct SimWheel {
    config: SimConfig,
    state: RefCell<SimState>,
}

impl SimWheel {
    /// Create a wheel resting exactly on the home slot mark
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: RefCell::new(SimState {
                angle: config.home_slot as u32 * config.ticks_per_slot,
                bridge: [false, false],
                pending_ns: 0,
                elapsed_ns: 0,
                travel: [0, 0],
                motor_starts: 0,
                refused_reversals: 0,
                shoot_through: 0,
                home_fault: None,
                proximity_fault: None,
            }),
        }
    }

    /// Geometry in use
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks per revolution
    pub fn circumference(&self) -> u32 {
        self.config.slot_count as u32 * self.config.ticks_per_slot
    }

    /// Current wheel angle in ticks
    pub fn angle(&self) -> u32 {
        self.state.borrow().angle
    }

    /// Turn the wheel by hand to `ticks`
    pub fn set_angle(&self, ticks: u32) {
        let circumference = self.circumference();
        self.state.borrow_mut().angle = ticks % circumference;
    }

    /// Turn the wheel by hand onto the mark of `slot`
    pub fn place_at(&self, slot: Slot) {
        self.set_angle(self.mark(slot));
    }

    /// Slot whose mark is currently in front of the sensors
    pub fn slot_at_mark(&self) -> Option<Slot> {
        let angle = self.angle();
        (0..self.config.slot_count).find(|&slot| self.near(angle, self.mark(slot)))
    }

    /// Direction the motor is currently driven in
    pub fn direction(&self) -> Option<Direction> {
        self.state.borrow().direction()
    }

    /// Check if the motor is driven
    pub fn is_running(&self) -> bool {
        self.direction().is_some()
    }

    /// Simulated time since creation
    pub fn elapsed_ms(&self) -> u64 {
        self.state.borrow().elapsed_ns / 1_000_000
    }

    /// Total ticks travelled in `direction`
    pub fn travel(&self, direction: Direction) -> u64 {
        let state = self.state.borrow();
        match direction {
            Direction::Forward => state.travel[0],
            Direction::Backward => state.travel[1],
        }
    }

    /// Number of times the motor went from stopped to running
    pub fn motor_starts(&self) -> u32 {
        self.state.borrow().motor_starts
    }

    /// Reversals requested through [`SimMotor`] while running
    pub fn refused_reversals(&self) -> u32 {
        self.state.borrow().refused_reversals
    }

    /// Times both bridge inputs were active together
    pub fn shoot_through(&self) -> u32 {
        self.state.borrow().shoot_through
    }

    /// Inject or clear a sensor fault
    pub fn set_fault(&self, sensor: SensorId, fault: Option<SensorFault>) {
        let mut state = self.state.borrow_mut();
        match sensor {
            SensorId::Home => state.home_fault = fault,
            SensorId::Proximity => state.proximity_fault = fault,
        }
    }

    /// Motor handle
    pub fn motor(&self) -> SimMotor<'_> {
        SimMotor { wheel: self }
    }

    /// Sensor handle
    pub fn sensor(&self, id: SensorId) -> SimSensor<'_> {
        SimSensor { wheel: self, id }
    }

    /// Home sensor handle
    pub fn home_sensor(&self) -> SimSensor<'_> {
        self.sensor(SensorId::Home)
    }

    /// Proximity sensor handle
    pub fn proximity_sensor(&self) -> SimSensor<'_> {
        self.sensor(SensorId::Proximity)
    }

    /// Raw sensor output as an active high input pin
    pub fn sensor_pin(&self, id: SensorId) -> SimSensorPin<'_> {
        SimSensorPin { wheel: self, id }
    }

    /// Bridge input A (drives forward)
    pub fn bridge_a(&self) -> SimBridgePin<'_> {
        SimBridgePin {
            wheel: self,
            input: A,
        }
    }

    /// Bridge input B (drives backward)
    pub fn bridge_b(&self) -> SimBridgePin<'_> {
        SimBridgePin {
            wheel: self,
            input: B,
        }
    }

    /// Delay handle; the only way simulated time passes
    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay { wheel: self }
    }

    fn mark(&self, slot: Slot) -> u32 {
        slot as u32 * self.config.ticks_per_slot
    }

    fn near(&self, angle: u32, mark: u32) -> bool {
        let circumference = self.circumference();
        let d = angle.abs_diff(mark) % circumference;
        d.min(circumference - d) <= self.config.window
    }

    fn sense(&self, id: SensorId) -> bool {
        let (fault, angle) = {
            let state = self.state.borrow();
            let fault = match id {
                SensorId::Home => state.home_fault,
                SensorId::Proximity => state.proximity_fault,
            };
            (fault, state.angle)
        };

        match fault {
            Some(SensorFault::Stuck) => true,
            Some(SensorFault::Dead) => false,
            None => match id {
                SensorId::Home => self.near(angle, self.mark(self.config.home_slot)),
                SensorId::Proximity => self.slot_at_mark().is_some(),
            },
        }
    }

    fn advance_ns(&self, ns: u64) {
        let circumference = self.circumference() as u64;
        let mut state = self.state.borrow_mut();

        state.elapsed_ns += ns;
        let total = state.pending_ns + ns;
        let ms = total / 1_000_000;
        state.pending_ns = total % 1_000_000;

        let Some(direction) = state.direction() else {
            return;
        };
        let ticks = ms * self.config.ticks_per_ms as u64;
        let angle = state.angle as u64;
        state.angle = match direction {
            Direction::Forward => {
                state.travel[0] += ticks;
                (angle + ticks) % circumference
            }
            Direction::Backward => {
                state.travel[1] += ticks;
                (angle + circumference - ticks % circumference) % circumference
            }
        } as u32;
    }
}

/// Motor driven directly
pub struct SimMotor<'a> {
    wheel: &'a SimWheel,
}

impl WheelMotor for SimMotor<'_> {
    fn run(&mut self, direction: Direction) {
        let mut state = self.wheel.state.borrow_mut();
        match state.direction() {
            Some(current) if current == direction => {}
            Some(_) => {
                state.refused_reversals += 1;
                state.set_bridge(A, false);
                state.set_bridge(B, false);
            }
            None => {
                let (idle, driven) = match direction {
                    Direction::Forward => (B, A),
                    Direction::Backward => (A, B),
                };
                state.set_bridge(idle, false);
                state.set_bridge(driven, true);
            }
        }
    }

    fn stop(&mut self) {
        let mut state = self.wheel.state.borrow_mut();
        state.set_bridge(A, false);
        state.set_bridge(B, false);
    }

    fn is_running(&self) -> bool {
        self.wheel.is_running()
    }
}

/// Slot sensor
pub struct SimSensor<'a> {
    wheel: &'a SimWheel,
    id: SensorId,
}

impl SlotSensor for SimSensor<'_> {
    fn is_triggered(&mut self) -> bool {
        self.wheel.sense(self.id)
    }
}

/// Sensor output line, high while triggered
pub struct SimSensorPin<'a> {
    wheel: &'a SimWheel,
    id: SensorId,
}

impl InputPin for SimSensorPin<'_> {
    fn is_high(&mut self) -> bool {
        self.wheel.sense(self.id)
    }
}

/// H-bridge input, active high
pub struct SimBridgePin<'a> {
    wheel: &'a SimWheel,
    input: usize,
}

impl OutputPin for SimBridgePin<'_> {
    fn set_high(&mut self) {
        self.wheel.state.borrow_mut().set_bridge(self.input, true);
    }

    fn set_low(&mut self) {
        self.wheel.state.borrow_mut().set_bridge(self.input, false);
    }

    fn is_set_high(&self) -> bool {
        self.wheel.state.borrow().bridge[self.input]
    }
}

/// Delay that advances simulated time
pub struct SimDelay<'a> {
    wheel: &'a SimWheel,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.wheel.advance_ns(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.wheel.advance_ns(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wheel.advance_ns(ms as u64 * 1_000_000);
    }
}
