//! Position controller
//!
//! Owns the motor, both slot sensors and the delay source, and keeps the
//! only copy of the wheel state (`position`, `lost`). There is no encoder:
//! the wheel is moved one slot boundary at a time and each boundary is
//! confirmed by the sensor that belongs to the slot being approached.
//!
//! # Slot search
//!
//! ```text
//!   run(depart) ─ settle ─┬─ triggered? ── poll ─┐      (leave current mark)
//!                         │        ▲─────────────┘
//!                         └─ clear ── stop
//!   run(direction) ── poll ─┬─ triggered ──────────── stop, arrived
//!                ▲──────────┤
//!                           └─ max_search_steps ───── stop, lost
//! ```
//!
//! Everything blocks on the calling thread. A move holds `&mut self` from
//! start to finish, so callers sharing a controller must serialize whole
//! moves.

use embedded_hal::delay::DelayNs;

use crate::config::{ConfigError, TimingConfig, WheelConfig};
use crate::traits::{Direction, FilterWheel, SlotSensor, WheelMotor, WheelStatus};
use crate::Slot;

use super::error::MoveError;
use super::planner::{plan, Plan};
use super::resolver::SensorResolver;

/// Direction used to search for the home slot when the wheel is lost
pub const HOMING_DIRECTION: Direction = Direction::Forward;

/// Slot-by-slot position controller
pub struct PositionController<M, H, P, D> {
    motor: M,
    sensors: SensorResolver<H, P>,
    delay: D,
    timing: TimingConfig,
    slot_count: u8,
    status: WheelStatus,
}

impl<M, H, P, D> PositionController<M, H, P, D>
where
    M: WheelMotor,
    H: SlotSensor,
    P: SlotSensor,
    D: DelayNs,
{
    /// Create a controller
    ///
    /// The wheel starts lost at the home slot: its real position is unknown
    /// until the first search confirms it.
    pub fn new(
        config: &WheelConfig,
        motor: M,
        home_sensor: H,
        proximity_sensor: P,
        delay: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            motor,
            sensors: SensorResolver::new(home_sensor, proximity_sensor, config.home_slot),
            delay,
            timing: config.timing,
            slot_count: config.slot_count,
            status: WheelStatus {
                position: config.home_slot,
                lost: true,
            },
        })
    }

    /// Current state
    pub fn status(&self) -> WheelStatus {
        self.status
    }

    /// Last confirmed slot (stale while lost)
    pub fn position(&self) -> Slot {
        self.status.position
    }

    /// Check if the position is unconfirmed
    pub fn is_lost(&self) -> bool {
        self.status.lost
    }

    /// Number of slots on the wheel
    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    /// Slot carrying the home sensor
    pub fn home_slot(&self) -> Slot {
        self.sensors.home_slot()
    }

    /// Route a move to `target` would take from the current position
    ///
    /// Does not account for the homing search a lost wheel runs first.
    pub fn plan(&self, target: Slot) -> Result<Plan, MoveError> {
        self.check_slot(target)?;
        Ok(plan(self.status.position, target, self.slot_count))
    }

    /// Move to `target`
    ///
    /// A lost wheel is homed first. The move then crosses one slot
    /// boundary per search along the shorter way round; a move to the
    /// current slot still runs one search to correct drift. The first
    /// failing search ends the move and leaves the wheel lost.
    pub fn move_to(&mut self, target: Slot) -> Result<(), MoveError> {
        self.check_slot(target)?;

        if self.status.lost {
            self.home()?;
        }

        let route = plan(self.status.position, target, self.slot_count);

        if route.steps == 0 {
            return self.search(route.direction, self.status.position);
        }

        for _ in 0..route.steps {
            let next = route.direction.step(self.status.position, self.slot_count);
            self.search(route.direction, next)?;
        }

        Ok(())
    }

    /// Search for the home slot
    pub fn home(&mut self) -> Result<(), MoveError> {
        let home = self.sensors.home_slot();
        self.search(HOMING_DIRECTION, home)
            .map_err(|_| MoveError::HomingFailed)
    }

    /// Leave the current sensor mark, then approach `target_slot` in
    /// `direction` until its sensor triggers
    ///
    /// When `target_slot` is the current slot the wheel departs backward so
    /// it actually leaves the mark it is standing on before re-approaching.
    /// The motor is always stopped on return.
    pub fn search(&mut self, direction: Direction, target_slot: Slot) -> Result<(), MoveError> {
        self.check_slot(target_slot)?;

        let sensor = self.sensors.sensor_for(target_slot);
        let depart = if target_slot == self.status.position {
            Direction::Backward
        } else {
            direction
        };

        // Leave the mark
        self.motor.run(depart);
        self.delay.delay_ms(self.timing.settle_ms);

        let mut steps = 0;
        while self.sensors.is_triggered(sensor) {
            if steps >= self.timing.max_search_steps {
                return self.abort_search();
            }
            self.delay.delay_ms(self.timing.poll_interval_ms);
            steps += 1;
        }
        self.motor.stop();

        // Approach
        self.motor.run(direction);
        for _ in 0..self.timing.max_search_steps {
            self.delay.delay_ms(self.timing.poll_interval_ms);
            if self.sensors.is_triggered(sensor) {
                self.motor.stop();
                self.status = WheelStatus {
                    position: target_slot,
                    lost: false,
                };
                return Ok(());
            }
        }

        self.abort_search()
    }

    /// Motor handle
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Delay source
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Give back the hardware
    pub fn release(self) -> (M, H, P, D) {
        let (home, proximity) = self.sensors.release();
        (self.motor, home, proximity, self.delay)
    }

    fn abort_search(&mut self) -> Result<(), MoveError> {
        self.motor.stop();
        self.status.lost = true;
        Err(MoveError::SearchTimeout)
    }

    fn check_slot(&self, slot: Slot) -> Result<(), MoveError> {
        if slot < self.slot_count {
            Ok(())
        } else {
            Err(MoveError::InvalidTarget)
        }
    }
}

impl<M, H, P, D> FilterWheel for PositionController<M, H, P, D>
where
    M: WheelMotor,
    H: SlotSensor,
    P: SlotSensor,
    D: DelayNs,
{
    fn slot_count(&self) -> u8 {
        self.slot_count
    }

    fn status(&self) -> WheelStatus {
        self.status
    }

    fn move_to(&mut self, target: Slot) -> Result<(), MoveError> {
        PositionController::move_to(self, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;

    /// Sensor samples and motor events a single test can record
    const CAPACITY: usize = 64;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum MotorEvent {
        Run(Direction),
        Stop,
    }

    /// Motor that records every call
    #[derive(Default)]
    struct MockMotor {
        events: Vec<MotorEvent, CAPACITY>,
        running: bool,
    }

    impl MockMotor {
        /// Number of searches started (each search runs the motor twice
        /// unless it aborts while departing)
        fn approaches(&self) -> Vec<Direction, CAPACITY> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    MotorEvent::Run(d) => Some(*d),
                    MotorEvent::Stop => None,
                })
                .skip(1)
                .step_by(2)
                .collect()
        }

        fn departures(&self) -> Vec<Direction, CAPACITY> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    MotorEvent::Run(d) => Some(*d),
                    MotorEvent::Stop => None,
                })
                .step_by(2)
                .collect()
        }

        fn runs(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, MotorEvent::Run(_)))
                .count()
        }
    }

    impl WheelMotor for MockMotor {
        fn run(&mut self, direction: Direction) {
            self.events.push(MotorEvent::Run(direction)).unwrap();
            self.running = true;
        }

        fn stop(&mut self) {
            self.events.push(MotorEvent::Stop).unwrap();
            self.running = false;
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    /// Sensor that plays back a fixed list of samples, then `fallback`
    struct Scripted {
        samples: Vec<bool, CAPACITY>,
        next: usize,
        fallback: bool,
        reads: usize,
    }

    impl Scripted {
        fn new(samples: &[bool]) -> Self {
            Self {
                samples: Vec::from_slice(samples).unwrap(),
                next: 0,
                fallback: false,
                reads: 0,
            }
        }

        fn never() -> Self {
            Self::new(&[])
        }

        fn always() -> Self {
            Self {
                fallback: true,
                ..Self::new(&[])
            }
        }

        /// `count` searches that each see the mark clear on departure and
        /// arrive on the second approach sample
        fn arrivals(count: usize) -> Self {
            let mut samples: Vec<bool, CAPACITY> = Vec::new();
            for _ in 0..count {
                samples.extend_from_slice(&[false, false, true]).unwrap();
            }
            Self::new(&samples)
        }
    }

    impl SlotSensor for Scripted {
        fn is_triggered(&mut self) -> bool {
            self.reads += 1;
            let sample = self.samples.get(self.next).copied().unwrap_or(self.fallback);
            self.next += 1;
            sample
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ms: u64,
        calls: u32,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += (ns / 1_000_000) as u64;
            self.calls += 1;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms as u64;
            self.calls += 1;
        }
    }

    type Controller = PositionController<MockMotor, Scripted, Scripted, MockDelay>;

    fn config() -> WheelConfig {
        let mut config = WheelConfig::default();
        config.timing = TimingConfig {
            settle_ms: 10,
            poll_interval_ms: 2,
            max_search_steps: 50,
        };
        config
    }

    fn controller(home: Scripted, proximity: Scripted) -> Controller {
        PositionController::new(
            &config(),
            MockMotor::default(),
            home,
            proximity,
            MockDelay::default(),
        )
        .unwrap()
    }

    /// Controller that already knows it is at `slot`
    fn homed_at(slot: Slot, proximity: Scripted) -> Controller {
        let mut c = controller(Scripted::arrivals(1), proximity);
        c.home().unwrap();
        if slot != 0 {
            c.status.position = slot;
        }
        c.motor.events.clear();
        c
    }

    #[test]
    fn test_starts_lost_at_home() {
        let c = controller(Scripted::never(), Scripted::never());
        assert_eq!(
            c.status(),
            WheelStatus {
                position: 0,
                lost: true
            }
        );
        assert!(!c.motor().is_running());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut cfg = config();
        cfg.slot_count = 1;
        let result = PositionController::new(
            &cfg,
            MockMotor::default(),
            Scripted::never(),
            Scripted::never(),
            MockDelay::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidSlotCount)));
    }

    #[test]
    fn test_invalid_target_touches_nothing() {
        let mut c = controller(Scripted::never(), Scripted::never());

        assert_eq!(c.move_to(5), Err(MoveError::InvalidTarget));
        assert_eq!(c.move_to(200), Err(MoveError::InvalidTarget));

        assert!(c.motor().events.is_empty());
        assert_eq!(c.delay().calls, 0);
        let (_, home, proximity, _) = c.release();
        assert_eq!(home.reads, 0);
        assert_eq!(proximity.reads, 0);
    }

    #[test]
    fn test_lost_wheel_homes_before_moving() {
        // Home search, then two forward proximity searches
        let mut c = controller(Scripted::arrivals(1), Scripted::arrivals(2));

        assert_eq!(c.move_to(2), Ok(()));
        assert_eq!(
            c.status(),
            WheelStatus {
                position: 2,
                lost: false
            }
        );

        // Homing starts from the assumed home slot, so it departs backward
        assert_eq!(
            c.motor().departures().as_slice(),
            &[Direction::Backward, Direction::Forward, Direction::Forward]
        );
        assert_eq!(c.motor().approaches().as_slice(), &[Direction::Forward; 3]);
    }

    #[test]
    fn test_homing_failure() {
        let mut c = controller(Scripted::never(), Scripted::arrivals(4));
        c.status.position = 3;

        assert_eq!(c.move_to(1), Err(MoveError::HomingFailed));
        assert_eq!(
            c.status(),
            WheelStatus {
                position: 3,
                lost: true
            }
        );
        assert!(!c.motor().is_running());

        // Requested target was never attempted
        let (_, _, proximity, _) = c.release();
        assert_eq!(proximity.reads, 0);
    }

    #[test]
    fn test_backward_route_crosses_home() {
        // 0 -> 3 on five slots: backward through 4
        let mut c = homed_at(0, Scripted::arrivals(2));

        assert_eq!(c.move_to(3), Ok(()));
        assert_eq!(c.position(), 3);
        assert!(!c.is_lost());
        assert_eq!(
            c.motor().approaches().as_slice(),
            &[Direction::Backward, Direction::Backward]
        );
    }

    #[test]
    fn test_forward_route() {
        let mut c = homed_at(0, Scripted::arrivals(2));

        assert_eq!(c.move_to(2), Ok(()));
        assert_eq!(c.position(), 2);
        assert_eq!(
            c.motor().approaches().as_slice(),
            &[Direction::Forward, Direction::Forward]
        );
    }

    #[test]
    fn test_same_slot_runs_exactly_one_search() {
        let mut c = homed_at(2, Scripted::arrivals(1));

        assert_eq!(c.move_to(2), Ok(()));
        assert_eq!(c.position(), 2);
        assert_eq!(c.motor().runs(), 2);
        assert_eq!(c.motor().departures().as_slice(), &[Direction::Backward]);
        assert_eq!(c.motor().approaches().as_slice(), &[Direction::Forward]);
    }

    #[test]
    fn test_drift_correction_at_home_uses_home_sensor() {
        // Home sensor scripted for homing plus one correction
        let mut c = controller(Scripted::arrivals(2), Scripted::never());
        c.home().unwrap();

        assert_eq!(c.move_to(0), Ok(()));
        assert_eq!(c.position(), 0);
        let (_, _, proximity, _) = c.release();
        assert_eq!(proximity.reads, 0);
    }

    #[test]
    fn test_search_timeout_stops_motor_and_sets_lost() {
        let mut c = homed_at(0, Scripted::never());

        assert_eq!(c.move_to(1), Err(MoveError::SearchTimeout));
        assert_eq!(
            c.status(),
            WheelStatus {
                position: 0,
                lost: true
            }
        );
        assert_eq!(c.motor().events.last(), Some(&MotorEvent::Stop));
        assert!(!c.motor().is_running());
    }

    #[test]
    fn test_timeout_is_bounded_by_max_steps() {
        let mut c = homed_at(0, Scripted::never());
        let before = c.delay().total_ms;

        let _ = c.search(Direction::Forward, 1);

        // settle + one departure sample + max_search_steps approach polls
        let timing = config().timing;
        let expected = timing.settle_ms as u64
            + timing.max_search_steps as u64 * timing.poll_interval_ms as u64;
        assert_eq!(c.delay().total_ms - before, expected);

        let (_, _, proximity, _) = c.release();
        assert_eq!(proximity.reads as u32, 1 + config().timing.max_search_steps);
    }

    #[test]
    fn test_failed_step_stops_remaining_steps() {
        // First of two forward steps arrives, second never does
        let mut c = homed_at(0, Scripted::arrivals(1));

        assert_eq!(c.move_to(2), Err(MoveError::SearchTimeout));
        assert_eq!(c.position(), 1);
        assert!(c.is_lost());
        assert_eq!(c.motor().approaches().len(), 2);
    }

    #[test]
    fn test_lost_after_failure_rehomes_on_next_move() {
        let mut c = homed_at(0, Scripted::never());
        assert!(c.move_to(1).is_err());
        assert!(c.is_lost());

        // Home sensor script was consumed by the first homing; give it one more
        let (motor, _, _, delay) = c.release();
        let mut c = PositionController::new(
            &config(),
            motor,
            Scripted::arrivals(1),
            Scripted::arrivals(1),
            delay,
        )
        .unwrap();
        c.motor.events.clear();

        assert_eq!(c.move_to(1), Ok(()));
        assert_eq!(c.motor().runs(), 4);
        assert!(!c.is_lost());
    }

    #[test]
    fn test_stuck_sensor_times_out_while_departing() {
        // Proximity never clears: the wheel cannot leave the mark
        let mut c = homed_at(1, Scripted::always());

        assert_eq!(c.move_to(2), Err(MoveError::SearchTimeout));
        assert!(c.is_lost());
        assert_eq!(c.position(), 1);
        assert_eq!(c.motor().runs(), 1);
        assert!(!c.motor().is_running());
    }

    #[test]
    fn test_departure_waits_while_triggered() {
        // Mark stays visible for three samples after settling
        let proximity = Scripted::new(&[true, true, true, false, false, true]);
        let mut c = homed_at(0, proximity);

        assert_eq!(c.move_to(1), Ok(()));
        let events = &c.motor().events;
        assert_eq!(
            events[..],
            [
                MotorEvent::Run(Direction::Forward),
                MotorEvent::Stop,
                MotorEvent::Run(Direction::Forward),
                MotorEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_plan_reports_route() {
        let c = homed_at(0, Scripted::never());
        assert_eq!(
            c.plan(3),
            Ok(Plan {
                direction: Direction::Backward,
                steps: 2
            })
        );
        assert_eq!(c.plan(9), Err(MoveError::InvalidTarget));
    }

    #[test]
    fn test_filter_wheel_trait() {
        fn drive<W: FilterWheel>(w: &mut W) -> Result<(), MoveError> {
            w.move_to(1)
        }

        let mut c = homed_at(0, Scripted::arrivals(1));
        assert_eq!(drive(&mut c), Ok(()));
        assert_eq!(FilterWheel::position(&c), 1);
        assert!(!FilterWheel::is_lost(&c));
    }

    proptest! {
        #[test]
        fn prop_successful_move_arrives(
            n in 2u8..=16,
            home in 0u8..16,
            start in 0u8..16,
            target in 0u8..16,
        ) {
            let mut cfg = config();
            cfg.slot_count = n;
            cfg.home_slot = home % n;

            let mut c = PositionController::new(
                &cfg,
                MockMotor::default(),
                Scripted::arrivals(16),
                Scripted::arrivals(16),
                MockDelay::default(),
            )
            .unwrap();
            c.status = WheelStatus { position: start % n, lost: false };

            prop_assert_eq!(c.move_to(target % n), Ok(()));
            prop_assert_eq!(c.status(), WheelStatus { position: target % n, lost: false });
            prop_assert!(!c.motor().is_running());

            let steps = c.plan(target % n).map(|p| p.steps);
            prop_assert_eq!(steps, Ok(0));
        }
    }
}
