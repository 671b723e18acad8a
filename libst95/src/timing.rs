// libst95/src/timing.rs

//! Named deadlines and settle delays.
//!
//! The supervisor never retries anything. It either sleeps through a settle
//! period (ramp-up, oscillator start) or hands out a [`Deadline`] that
//! callers check while waiting for the chip.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::constants::{
    DETECT_TIME_MS, ECHO_WAIT_TIME_MS, HFO_SETUP_TIME_MS, NO_RESPONSE_TIME_MS, RAMP_UP_TIME_MS,
};
use crate::utils::{ms, whole_ms};

/// Blocking sleep capability handed to the driver.
pub trait Delay {
    /// Block for `duration`.
    fn delay(&mut self, duration: Duration);
}

/// `std::thread::sleep` based delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Adapter for any `embedded-hal` delay provider.
#[cfg(feature = "hal")]
pub struct HalDelay<D>(pub D);

#[cfg(feature = "hal")]
impl<D: embedded_hal::delay::DelayNs> Delay for HalDelay<D> {
    fn delay(&mut self, duration: Duration) {
        let us = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.0.delay_us(us);
    }
}

/// Delay that does not sleep and records every request. Clones share the
/// same log so tests can keep a handle after moving one into a device.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    log: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingDelay {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested wait, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.log.borrow().clone()
    }

    /// How often `duration` was waited.
    pub fn count_of(&self, duration: Duration) -> usize {
        self.log.borrow().iter().filter(|d| **d == duration).count()
    }

    /// Forget recorded waits.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.log.borrow_mut().push(duration);
    }
}

/// Deadline names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineKind {
    /// Power-up / RF field ramp
    RampUp,
    /// High-frequency oscillator stabilisation
    OscillatorSetup,
    /// Wait for the echo byte
    EchoWait,
    /// Window for one air exchange with a tag
    TagDetect,
    /// Overall "nothing answered" ceiling
    NoResponse,
}

/// Deadline budgets in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timings {
    /// RF field ramp-up
    pub ramp_up_ms: u64,
    /// High-frequency oscillator setup
    pub hfo_setup_ms: u64,
    /// Echo reply wait
    pub echo_wait_ms: u64,
    /// One air exchange
    pub detect_ms: u64,
    /// Overall scan ceiling
    pub no_response_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            ramp_up_ms: RAMP_UP_TIME_MS,
            hfo_setup_ms: HFO_SETUP_TIME_MS,
            echo_wait_ms: ECHO_WAIT_TIME_MS,
            detect_ms: DETECT_TIME_MS,
            no_response_ms: NO_RESPONSE_TIME_MS,
        }
    }
}

impl Timings {
    /// Budget of `kind` in milliseconds.
    pub fn budget_ms(&self, kind: DeadlineKind) -> u64 {
        match kind {
            DeadlineKind::RampUp => self.ramp_up_ms,
            DeadlineKind::OscillatorSetup => self.hfo_setup_ms,
            DeadlineKind::EchoWait => self.echo_wait_ms,
            DeadlineKind::TagDetect => self.detect_ms,
            DeadlineKind::NoResponse => self.no_response_ms,
        }
    }
}

/// Outcome of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Finished within budget after this long
    Elapsed(Duration),
    /// Budget of this kind ran out
    TimedOut(DeadlineKind),
}

/// A running deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    kind: DeadlineKind,
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Kind this deadline was started for.
    pub fn kind(&self) -> DeadlineKind {
        self.kind
    }

    /// Time left, `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.budget.checked_sub(self.started.elapsed())
    }

    /// Whole milliseconds left.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining().map(whole_ms).unwrap_or(0)
    }

    /// Elapsed time, or which budget ran out.
    pub fn check(&self) -> Wait {
        match self.remaining() {
            Some(_) => Wait::Elapsed(self.started.elapsed()),
            None => Wait::TimedOut(self.kind),
        }
    }

    /// True once the budget is used up.
    pub fn expired(&self) -> bool {
        matches!(self.check(), Wait::TimedOut(_))
    }
}

/// Owns the deadline budgets and the sleep capability.
pub struct TimeoutSupervisor {
    timings: Timings,
    delay: Box<dyn Delay>,
}

impl TimeoutSupervisor {
    /// Supervisor over `timings`, sleeping through `delay`.
    pub fn new(timings: Timings, delay: Box<dyn Delay>) -> Self {
        Self { timings, delay }
    }

    /// Configured budgets.
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Budget of `kind`.
    pub fn budget(&self, kind: DeadlineKind) -> Duration {
        ms(self.timings.budget_ms(kind))
    }

    /// Budget of `kind` in milliseconds.
    pub fn budget_ms(&self, kind: DeadlineKind) -> u64 {
        self.timings.budget_ms(kind)
    }

    /// Sleep through the whole budget of `kind`.
    pub fn wait(&mut self, kind: DeadlineKind) -> Wait {
        let d = self.budget(kind);
        log::trace!("waiting {:?} ({} ms)", kind, d.as_millis());
        self.delay.delay(d);
        Wait::Elapsed(d)
    }

    /// Ramp-up then oscillator setup. Required after power-up, field-on and
    /// baud rate changes before the next command.
    pub fn settle(&mut self) {
        self.wait(DeadlineKind::RampUp);
        self.wait(DeadlineKind::OscillatorSetup);
    }

    /// Start a deadline of `kind` now.
    pub fn start(&self, kind: DeadlineKind) -> Deadline {
        Deadline {
            kind,
            started: Instant::now(),
            budget: self.budget(kind),
        }
    }
}
