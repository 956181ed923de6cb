//! Command session
//!
//! Serves the serial protocol on top of a [`FilterWheel`]. Each decoded
//! command gets exactly one reply carrying the position after the command
//! ran, whether or not a move succeeded. Lines that do not decode are
//! dropped without a reply.
//!
//! `SETFILTER` runs the configured [`RetryPolicy`]: the move is repeated
//! `attempts` times back to back (a coarse pass then a correction pass with
//! the default policy). A target the wheel rejects outright is not retried.

use core::sync::atomic::{AtomicBool, Ordering};

use iris_protocol::{Command, Reply};

use crate::config::RetryPolicy;
use crate::motion::MoveError;
use crate::traits::FilterWheel;
use crate::Slot;

/// Protocol session bound to one wheel
pub struct Session<'a, W> {
    wheel: W,
    retry: RetryPolicy,
    busy: &'a AtomicBool,
    last_result: Option<Result<(), MoveError>>,
}

impl<'a, W: FilterWheel> Session<'a, W> {
    /// Create a session
    ///
    /// `busy` is raised for the duration of every `SETFILTER` so other
    /// tasks can tell a move is in progress.
    pub fn new(wheel: W, retry: RetryPolicy, busy: &'a AtomicBool) -> Self {
        busy.store(false, Ordering::Release);
        Self {
            wheel,
            retry,
            busy,
            last_result: None,
        }
    }

    /// Unsolicited position announcement sent once at startup
    pub fn greeting(&self) -> Reply {
        Reply::Position(self.wheel.position())
    }

    /// Decode and execute one line (delimiter already stripped)
    ///
    /// Returns `None` for input that is not a command.
    pub fn handle_line(&mut self, line: &[u8]) -> Option<Reply> {
        Command::parse(line).ok().map(|command| self.handle(command))
    }

    /// Execute a command and build its reply
    pub fn handle(&mut self, command: Command) -> Reply {
        if let Command::SetFilter(requested) = command {
            let result = self.set_filter(requested);
            self.last_result = Some(result);
        }
        Reply::Position(self.wheel.position())
    }

    /// Move to `requested` under the retry policy
    ///
    /// Returns the outcome of the last attempt.
    pub fn set_filter(&mut self, requested: i32) -> Result<(), MoveError> {
        let target = Slot::try_from(requested).map_err(|_| MoveError::InvalidTarget)?;
        if target >= self.wheel.slot_count() {
            return Err(MoveError::InvalidTarget);
        }

        self.busy.store(true, Ordering::Release);
        let mut result = Ok(());
        for _ in 0..self.retry.attempts.max(1) {
            result = self.wheel.move_to(target);
            if result == Err(MoveError::InvalidTarget) {
                break;
            }
        }
        self.busy.store(false, Ordering::Release);

        result
    }

    /// Check if a command is executing
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Outcome of the most recent `SETFILTER`, if any
    pub fn last_result(&self) -> Option<Result<(), MoveError>> {
        self.last_result
    }

    /// Retry policy in use
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Wheel handle
    pub fn wheel(&self) -> &W {
        &self.wheel
    }

    /// Tear down the session and return the wheel
    pub fn into_inner(self) -> W {
        self.wheel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::WheelStatus;
    use heapless::Vec;

    /// Wheel that replays scripted move outcomes and records what it saw
    struct FakeWheel<'a> {
        status: WheelStatus,
        slot_count: u8,
        outcomes: Vec<Result<(), MoveError>, 8>,
        next_outcome: usize,
        moves: Vec<Slot, 8>,
        busy: &'a AtomicBool,
        busy_during_move: Vec<bool, 8>,
    }

    impl<'a> FakeWheel<'a> {
        fn new(busy: &'a AtomicBool) -> Self {
            Self {
                status: WheelStatus {
                    position: 0,
                    lost: true,
                },
                slot_count: 5,
                outcomes: Vec::new(),
                next_outcome: 0,
                moves: Vec::new(),
                busy,
                busy_during_move: Vec::new(),
            }
        }

        fn with_outcomes(busy: &'a AtomicBool, outcomes: &[Result<(), MoveError>]) -> Self {
            Self {
                outcomes: Vec::from_slice(outcomes).unwrap(),
                ..Self::new(busy)
            }
        }
    }

    impl FilterWheel for FakeWheel<'_> {
        fn slot_count(&self) -> u8 {
            self.slot_count
        }

        fn status(&self) -> WheelStatus {
            self.status
        }

        fn move_to(&mut self, target: Slot) -> Result<(), MoveError> {
            self.moves.push(target).unwrap();
            self.busy_during_move
                .push(self.busy.load(Ordering::Acquire))
                .unwrap();

            let outcome = self
                .outcomes
                .get(self.next_outcome)
                .copied()
                .unwrap_or(Ok(()));
            self.next_outcome += 1;
            match outcome {
                Ok(()) => {
                    self.status = WheelStatus {
                        position: target,
                        lost: false,
                    }
                }
                Err(MoveError::InvalidTarget) => {}
                Err(_) => self.status.lost = true,
            }
            outcome
        }
    }

    #[test]
    fn test_greeting_reports_position() {
        let busy = AtomicBool::new(false);
        let session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);
        assert_eq!(session.greeting(), Reply::Position(0));
        assert_eq!(session.greeting().encode().as_slice(), b"0#");
    }

    #[test]
    fn test_getfilter_does_not_move() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);

        assert_eq!(session.handle_line(b"GETFILTER"), Some(Reply::Position(0)));
        assert!(session.wheel().moves.is_empty());
        assert_eq!(session.last_result(), None);
    }

    #[test]
    fn test_setfilter_runs_retry_policy() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);

        assert_eq!(session.handle_line(b"SETFILTER2"), Some(Reply::Position(2)));
        assert_eq!(session.wheel().moves.as_slice(), &[2, 2]);
        assert_eq!(session.last_result(), Some(Ok(())));
        assert!(!session.wheel().is_lost());
    }

    #[test]
    fn test_single_attempt_policy() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::single(), &busy);

        session.handle(Command::SetFilter(3));
        assert_eq!(session.wheel().moves.as_slice(), &[3]);
    }

    #[test]
    fn test_out_of_range_never_reaches_wheel() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);

        for requested in [5, 9, -1, 256, i32::MAX, i32::MIN] {
            assert_eq!(
                session.handle(Command::SetFilter(requested)),
                Reply::Position(0)
            );
            assert_eq!(session.last_result(), Some(Err(MoveError::InvalidTarget)));
        }
        assert!(session.wheel().moves.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_invalid_target_is_not_retried() {
        let busy = AtomicBool::new(false);
        let wheel = FakeWheel::with_outcomes(&busy, &[Err(MoveError::InvalidTarget)]);
        let mut session = Session::new(wheel, RetryPolicy { attempts: 3 }, &busy);

        assert_eq!(session.set_filter(1), Err(MoveError::InvalidTarget));
        assert_eq!(session.wheel().moves.len(), 1);
    }

    #[test]
    fn test_failed_first_pass_is_corrected() {
        let busy = AtomicBool::new(false);
        let wheel = FakeWheel::with_outcomes(&busy, &[Err(MoveError::SearchTimeout), Ok(())]);
        let mut session = Session::new(wheel, RetryPolicy::default(), &busy);

        assert_eq!(session.handle_line(b"SETFILTER4"), Some(Reply::Position(4)));
        assert_eq!(session.last_result(), Some(Ok(())));
    }

    #[test]
    fn test_reply_sent_even_when_move_fails() {
        let busy = AtomicBool::new(false);
        let wheel = FakeWheel::with_outcomes(
            &busy,
            &[Err(MoveError::HomingFailed), Err(MoveError::HomingFailed)],
        );
        let mut session = Session::new(wheel, RetryPolicy::default(), &busy);

        assert_eq!(session.handle_line(b"SETFILTER1"), Some(Reply::Position(0)));
        assert_eq!(session.last_result(), Some(Err(MoveError::HomingFailed)));
        assert!(session.wheel().is_lost());
    }

    #[test]
    fn test_busy_only_while_moving() {
        let busy = AtomicBool::new(true);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);
        assert!(!session.is_busy());

        session.handle_line(b"SETFILTER1");
        assert_eq!(session.wheel().busy_during_move.as_slice(), &[true, true]);
        assert!(!session.is_busy());

        session.handle_line(b"GETFILTER");
        assert!(!session.is_busy());
    }

    #[test]
    fn test_malformed_lines_are_ignored() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);

        for line in [
            &b""[..],
            b"getfilter",
            b"GETFILTER ",
            b"SETFILTER",
            b"SETFILTERx",
            b"SETFILTER99999999999",
            b"HELLO",
        ] {
            assert_eq!(session.handle_line(line), None);
        }
        assert!(session.wheel().moves.is_empty());
    }

    #[test]
    fn test_into_inner_returns_wheel() {
        let busy = AtomicBool::new(false);
        let mut session = Session::new(FakeWheel::new(&busy), RetryPolicy::default(), &busy);
        session.handle_line(b"SETFILTER3");

        let wheel = session.into_inner();
        assert_eq!(wheel.position(), 3);
    }
}
