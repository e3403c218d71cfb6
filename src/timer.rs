//! Repeating timer resource
//!
//! A timer runs for as long as its guard is alive. Dropping the guard stops
//! it, so a timer cannot outlive the state that owns the guard.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Something that can run a fixed-rate repeating action
pub trait RepeatingTimer {
    /// Keeps the timer running; dropping it stops the timer
    type Guard;

    fn start(&self, period: Duration) -> Self::Guard;
}

#[derive(Debug)]
struct Schedule {
    generation: u64,
    period: Duration,
    next_due: Instant,
}

#[derive(Debug, Default)]
struct ClockState {
    generation: u64,
    schedule: Option<Schedule>,
}

/// Timer driven by a frame loop
///
/// The host polls [`FrameClock::due_ticks`] once per frame and runs the
/// repeating action that many times. One timer at a time: starting a new
/// one replaces the previous schedule.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    state: Rc<RefCell<ClockState>>,
}

/// Guard returned by [`FrameClock::start`]
#[derive(Debug)]
pub struct FrameTimerGuard {
    state: Rc<RefCell<ClockState>>,
    generation: u64,
}

impl Drop for FrameTimerGuard {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state
            .schedule
            .as_ref()
            .is_some_and(|schedule| schedule.generation == self.generation)
        {
            state.schedule = None;
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().schedule.is_some()
    }

    /// When the next tick is due, if a timer is running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow().schedule.as_ref().map(|schedule| schedule.next_due)
    }

    /// Number of ticks elapsed up to `now`; advances the schedule
    pub fn due_ticks(&self, now: Instant) -> u32 {
        let mut state = self.state.borrow_mut();
        let Some(schedule) = state.schedule.as_mut() else {
            return 0;
        };

        let mut ticks = 0;
        while schedule.next_due <= now {
            schedule.next_due += schedule.period;
            ticks += 1;
        }
        ticks
    }

    fn start_at(&self, period: Duration, now: Instant) -> FrameTimerGuard {
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        let generation = state.generation;
        // Zero periods would never let `due_ticks` terminate
        let period = period.max(Duration::from_millis(1));
        state.schedule = Some(Schedule {
            generation,
            period,
            next_due: now + period,
        });
        FrameTimerGuard {
            state: Rc::clone(&self.state),
            generation,
        }
    }
}

impl RepeatingTimer for FrameClock {
    type Guard = FrameTimerGuard;

    fn start(&self, period: Duration) -> FrameTimerGuard {
        self.start_at(period, Instant::now())
    }
}
