//! Cancellable, re-armable timers driven by a monotonic clock.
//!
//! Timers never block and never spawn threads. The owner polls them from its
//! own schedule (`fire_if_due` / `take_due`) and reacts to what they report,
//! so a timer cannot call back into a component while it is mid-update.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Clock shared between the components of one timeline
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Shared handle to the system clock
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        })
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *offset += by;
    }

    /// Move time forward by fractional seconds
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.base + offset
    }
}

/// One-shot timer. Arming an armed timer restarts the countdown.
pub struct OneShotTimer {
    clock: SharedClock,
    duration: Duration,
    deadline: Option<Instant>,
}

impl OneShotTimer {
    /// Create a disarmed timer with a default duration
    #[must_use]
    pub fn new(clock: SharedClock, duration: Duration) -> Self {
        Self {
            clock,
            duration,
            deadline: None,
        }
    }

    /// Start (or restart) the countdown with the configured duration
    pub fn arm(&mut self) {
        self.arm_for(self.duration);
    }

    /// Start (or restart) the countdown with an explicit duration
    pub fn arm_for(&mut self, duration: Duration) {
        self.duration = duration;
        self.deadline = Some(self.clock.now() + duration);
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a countdown is running
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the timer fires
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(self.clock.now()))
    }

    /// Returns `true` exactly once when the deadline has passed, disarming the timer
    pub fn fire_if_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for OneShotTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotTimer")
            .field("duration", &self.duration)
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Periodic timer producing one tick per elapsed interval
pub struct PeriodicTimer {
    clock: SharedClock,
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    /// Create a disarmed timer
    #[must_use]
    pub fn new(clock: SharedClock, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            next_due: None,
        }
    }

    /// Start ticking; the first tick is one interval from now
    pub fn arm(&mut self) {
        self.next_due = Some(self.clock.now() + self.interval);
    }

    /// Stop ticking. No tick is reported after this returns.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Whether the timer is ticking
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Current interval
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval in place. A running timer keeps its phase: the next
    /// tick lands one new interval after the previous one, but never earlier
    /// than now, so shortening the interval cannot produce a burst of ticks.
    pub fn set_interval(&mut self, interval: Duration) {
        if let Some(next) = self.next_due {
            let now = self.clock.now();
            let previous = next.checked_sub(self.interval).unwrap_or(now);
            self.next_due = Some((previous + interval).max(now));
        }
        self.interval = interval;
    }

    /// Time until the next tick
    #[must_use]
    pub fn until_next(&self) -> Option<Duration> {
        self.next_due
            .map(|d| d.saturating_duration_since(self.clock.now()))
    }

    /// Consume one due tick, if any. Call in a loop to catch up after a stall.
    pub fn take_due(&mut self) -> bool {
        match self.next_due {
            Some(next) if self.clock.now() >= next => {
                self.next_due = Some(next + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for PeriodicTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTimer")
            .field("interval", &self.interval)
            .field("armed", &self.is_armed())
            .finish()
    }
}
