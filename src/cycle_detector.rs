//! Gesture-cycle detection for jumping-jack style movements.
//!
//! Each frame is reduced to three predicates over the head, wrists and
//! ankles. A cycle starts when the arms are raised and together with the
//! feet together, and completes when the opposite posture follows. A
//! watchdog resets the count when a started cycle never completes.
//!
//! The detector never calls into other components. Whatever it observes is
//! queued as a [`CycleEvent`] and handed out by [`CycleDetector::take_events`].

use crate::config::DetectorConfig;
use crate::constants::NUM_LANDMARKS;
use crate::skeleton::{Frame, Landmark};
use crate::timer::{OneShotTimer, SharedClock};
use log::{debug, info};
use std::collections::VecDeque;

/// Phase of the current gesture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Waiting for the start posture
    Idle,
    /// Start posture seen, waiting for the end posture
    Started,
    /// End posture seen; only observable transiently within one step
    Ended,
}

/// Notifications emitted by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// A cycle start posture was recognised
    Started,
    /// A cycle completed; carries the new count
    CycleCompleted(u32),
    /// The watchdog expired before the started cycle completed
    TimedOut,
}

/// Predicate values for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Posture {
    /// Both wrists above the head
    pub arms_up: bool,
    /// Wrists horizontally close together
    pub arms_close: bool,
    /// Ankles horizontally close together
    pub feet_close: bool,
}

impl Posture {
    /// All three predicates hold (cycle start posture)
    #[must_use]
    pub fn is_start(&self) -> bool {
        self.arms_up && self.arms_close && self.feet_close
    }

    /// None of the predicates hold (cycle end posture)
    #[must_use]
    pub fn is_end(&self) -> bool {
        !self.arms_up && !self.arms_close && !self.feet_close
    }
}

/// Gesture-cycle state machine with a timeout watchdog
#[derive(Debug)]
pub struct CycleDetector {
    arms_close_threshold: f64,
    feet_close_threshold: f64,
    state: CycleState,
    cycle_count: u32,
    timed_out: bool,
    watchdog: OneShotTimer,
    events: VecDeque<CycleEvent>,
}

impl CycleDetector {
    /// Create a detector using `clock` for its watchdog
    #[must_use]
    pub fn new(config: &DetectorConfig, clock: SharedClock) -> Self {
        Self {
            arms_close_threshold: config.arms_close_threshold,
            feet_close_threshold: config.feet_close_threshold,
            state: CycleState::Idle,
            cycle_count: 0,
            timed_out: false,
            watchdog: OneShotTimer::new(clock, config.timeout()),
            events: VecDeque::new(),
        }
    }

    /// Evaluate the predicates for a frame without changing any state
    ///
    /// # Panics
    ///
    /// Panics if the frame does not have the reference landmark count
    #[must_use]
    pub fn evaluate(&self, frame: &Frame) -> Posture {
        assert_eq!(
            frame.len(),
            NUM_LANDMARKS,
            "frame has {} landmarks, detector expects {}",
            frame.len(),
            NUM_LANDMARKS
        );

        let head = frame.landmark(Landmark::Head);
        let left_wrist = frame.landmark(Landmark::WristLeft);
        let right_wrist = frame.landmark(Landmark::WristRight);
        let left_ankle = frame.landmark(Landmark::AnkleLeft);
        let right_ankle = frame.landmark(Landmark::AnkleRight);

        Posture {
            // Y grows upwards in sensor space
            arms_up: left_wrist.y > head.y && right_wrist.y > head.y,
            arms_close: (left_wrist.x - right_wrist.x).abs() < self.arms_close_threshold,
            feet_close: (left_ankle.x - right_ankle.x).abs() < self.feet_close_threshold,
        }
    }

    /// Advance the state machine with one frame
    ///
    /// # Panics
    ///
    /// Panics if the frame does not have the reference landmark count
    pub fn analyze(&mut self, frame: &Frame) {
        let posture = self.evaluate(frame);

        // A watchdog that expired between frames wins over this frame.
        self.poll();

        match self.state {
            CycleState::Idle if posture.is_start() => {
                self.state = CycleState::Started;
                self.timed_out = false;
                self.watchdog.arm();
                debug!("Cycle start detected");
                self.events.push_back(CycleEvent::Started);
            }
            CycleState::Started if posture.is_end() => {
                self.state = CycleState::Ended;
                self.complete_cycle();
            }
            _ => {}
        }
    }

    fn complete_cycle(&mut self) {
        self.cycle_count += 1;
        self.watchdog.cancel();
        self.timed_out = false;
        self.state = CycleState::Idle;
        info!("Cycle {} Detected.", self.cycle_count);
        self.events.push_back(CycleEvent::CycleCompleted(self.cycle_count));
    }

    /// Check the watchdog. Returns `true` if it fired during this call.
    pub fn poll(&mut self) -> bool {
        if !self.watchdog.fire_if_due() {
            return false;
        }

        info!(
            "Cycle timed out after {} completed cycles, resetting",
            self.cycle_count
        );
        self.state = CycleState::Idle;
        self.cycle_count = 0;
        self.timed_out = true;
        self.events.push_back(CycleEvent::TimedOut);
        true
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<CycleEvent> {
        self.events.drain(..).collect()
    }

    /// Completed cycles since the last reset or timeout
    #[must_use]
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Current phase
    #[must_use]
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Whether the last cycle attempt was ended by the watchdog
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// Whether the watchdog is currently counting down
    #[must_use]
    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog.is_armed()
    }

    /// Force the detector back to `Idle` with a zero count
    pub fn reset(&mut self) {
        self.state = CycleState::Idle;
        self.cycle_count = 0;
        self.watchdog.cancel();
        self.events.clear();
    }
}
