//! Playback of recorded frame sequences.
//!
//! The controller owns one loaded sequence and walks it forwards or
//! backwards on a periodic tick. Position changes come from two places: its
//! own ticks and external scrubs (a user dragging a timeline). Scrubbed
//! frames are re-analysed by the cycle detector for verification.

use crate::config::PlaybackConfig;
use crate::constants::{DEFAULT_FPS, MAX_TICK_INTERVAL};
use crate::cycle_detector::CycleDetector;
use crate::frame_format::decode_lines;
use crate::skeleton::{Frame, FrameSequence};
use crate::storage::Storage;
use crate::timer::{PeriodicTimer, SharedClock};
use crate::{Error, Result};
use log::{debug, info, warn};
use std::time::Duration;

/// Playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards higher frame indices
    #[default]
    Forward,
    /// Towards lower frame indices
    Backward,
}

impl Direction {
    /// The opposite direction
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Receives every frame the controller moves to. Rendering never feeds back
/// into playback state.
pub trait FrameRenderer {
    /// Display `frame`, which sits at `index` in the loaded sequence
    fn render(&mut self, frame: &Frame, index: usize);
}

/// Renderer that discards everything
#[derive(Debug, Default)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn render(&mut self, _frame: &Frame, _index: usize) {}
}

/// Frame-indexed, bidirectional, variable-rate player
#[derive(Debug)]
pub struct PlaybackController {
    sequence: Option<FrameSequence>,
    position: Option<usize>,
    direction: Direction,
    running: bool,
    rate: f64,
    max_rate: f64,
    tail_trim: usize,
    internal_change: bool,
    ticker: PeriodicTimer,
}

/// Tick interval for `rate` frames per second; `None` unless the rate is
/// positive and the interval fits within [`MAX_TICK_INTERVAL`]
fn interval_for(rate: f64) -> Option<Duration> {
    if !(rate > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate)
        .ok()
        .filter(|interval| *interval <= MAX_TICK_INTERVAL)
}

impl PlaybackController {
    /// Create a controller with nothing loaded
    #[must_use]
    pub fn new(config: &PlaybackConfig, clock: SharedClock) -> Self {
        let (rate, interval) = match interval_for(config.default_rate) {
            Some(interval) => (config.default_rate, interval),
            None => {
                warn!("Unusable default rate {}, falling back to {} fps", config.default_rate, DEFAULT_FPS);
                (DEFAULT_FPS, Duration::from_secs_f64(1.0 / DEFAULT_FPS))
            }
        };
        Self {
            sequence: None,
            position: None,
            direction: Direction::Forward,
            running: false,
            rate,
            max_rate: config.max_rate,
            tail_trim: config.tail_trim,
            internal_change: false,
            ticker: PeriodicTimer::new(clock, interval),
        }
    }

    /// Load a recording from storage. Returns the number of frames loaded.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the recording cannot be read, or [`Error::Parse`]
    /// if any line is malformed. The previously loaded sequence stays in place
    /// on failure.
    pub fn load(&mut self, storage: &dyn Storage, name: &str) -> Result<usize> {
        let lines = storage.read_all_lines(name)?;
        let count = self.load_lines(&lines)?;
        info!("Loaded {} frames from {}", count, name);
        Ok(count)
    }

    /// Decode and install a recording given as lines
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if any line is malformed
    pub fn load_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<usize> {
        let sequence = decode_lines(lines)?;
        let count = sequence.len();
        self.install(sequence);
        Ok(count)
    }

    /// Replace the loaded sequence. Playback halts and the position moves to
    /// the start of the range for the current direction.
    pub fn install(&mut self, sequence: FrameSequence) {
        self.ticker.cancel();
        self.running = false;
        self.sequence = Some(sequence);
        self.position = self.range_start();
        debug!(
            "Installed sequence of {} frames, position {:?}",
            self.sequence.as_ref().map_or(0, FrameSequence::len),
            self.position
        );
    }

    /// Index of the last playable frame, or `None` when nothing is playable
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        let len = self.sequence.as_ref().map_or(0, FrameSequence::len);
        if len == 0 {
            None
        } else {
            Some((len - 1).saturating_sub(self.tail_trim))
        }
    }

    fn range_start(&self) -> Option<usize> {
        match self.direction {
            Direction::Forward => self.last_index().map(|_| 0),
            Direction::Backward => self.last_index(),
        }
    }

    /// Start ticking. Does nothing unless a non-empty sequence is loaded.
    /// Returns whether playback is running afterwards.
    pub fn play(&mut self) -> bool {
        if self.last_index().is_none() {
            debug!("Play ignored: nothing loaded");
            return false;
        }
        if !self.running {
            self.ticker.arm();
            self.running = true;
            debug!("Playing {:?} at {} fps", self.direction, self.rate);
        }
        true
    }

    /// Stop ticking and keep the position
    pub fn pause(&mut self) {
        self.ticker.cancel();
        self.running = false;
    }

    /// Stop ticking and rewind to the start of the range for the current direction
    pub fn stop(&mut self) {
        self.ticker.cancel();
        self.running = false;
        self.position = self.range_start();
        debug!("Playback stopped at {:?}", self.position);
    }

    /// Flip the direction; running state and position are untouched
    pub fn reverse(&mut self) {
        self.direction = self.direction.reversed();
        debug!("Direction now {:?}", self.direction);
    }

    /// Change the playback rate in frames per second without moving the position
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] if the rate is not in `(0, max_rate]` or
    /// is slower than one frame per [`MAX_TICK_INTERVAL`]
    pub fn set_rate(&mut self, frames_per_second: f64) -> Result<()> {
        let interval = interval_for(frames_per_second)
            .filter(|_| frames_per_second <= self.max_rate)
            .ok_or(Error::InvalidRate(frames_per_second))?;
        self.rate = frames_per_second;
        self.ticker.set_interval(interval);
        Ok(())
    }

    /// Advance one frame in the current direction. Leaving the playable range
    /// stops playback instead. Returns the position after the tick.
    pub fn on_tick(&mut self) -> Option<usize> {
        let (Some(position), Some(last)) = (self.position, self.last_index()) else {
            return None;
        };

        self.internal_change = true;
        let next = match self.direction {
            Direction::Forward => position.checked_add(1).filter(|&p| p <= last),
            Direction::Backward => position.checked_sub(1),
        };
        match next {
            Some(p) => self.position = Some(p),
            None => self.stop(),
        }
        self.internal_change = false;

        self.position
    }

    /// Process every tick that has come due, rendering each new position.
    /// Returns the number of ticks processed.
    pub fn poll(&mut self, renderer: &mut dyn FrameRenderer) -> usize {
        let mut ticks = 0;
        while self.running && self.ticker.take_due() {
            ticks += 1;
            if let Some(index) = self.on_tick() {
                if let Some(frame) = self.sequence.as_ref().and_then(|s| s.get(index)) {
                    renderer.render(frame, index);
                }
            }
        }
        ticks
    }

    /// Handle a position change coming from outside (a timeline scrub).
    ///
    /// Echoes of the controller's own updates are ignored. A genuine scrub
    /// pauses playback, moves to `position` and feeds that frame to `detector`.
    /// Returns whether the scrub was applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `position` is outside the playable range
    pub fn on_external_scrub(&mut self, position: usize, detector: &mut CycleDetector) -> Result<bool> {
        if self.internal_change {
            return Ok(false);
        }
        let Some(last) = self.last_index() else {
            return Ok(false);
        };
        if position > last {
            return Err(Error::InvalidPosition {
                position,
                len: last + 1,
            });
        }

        self.pause();
        self.position = Some(position);
        if let Some(frame) = self.sequence.as_ref().and_then(|s| s.get(position)) {
            detector.analyze(frame);
        }
        debug!("Scrubbed to {}", position);
        Ok(true)
    }

    /// Frame at the current position
    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame> {
        let position = self.position?;
        self.sequence.as_ref()?.get(position)
    }

    /// The loaded sequence
    #[must_use]
    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    /// Current position; `None` when nothing playable is loaded
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Current direction
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the periodic advance is armed
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames per second
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Time between two ticks
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Time until the next tick, if playing
    #[must_use]
    pub fn until_next_tick(&self) -> Option<Duration> {
        self.ticker.until_next()
    }
}
