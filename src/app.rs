//! Main application module: wires the detector, capture session and
//! playback controller together and drives them from periodic schedules.

use crate::{
    capture_session::{CaptureSession, OfferOutcome, StopReason},
    config::Config,
    cycle_detector::{CycleDetector, CycleEvent},
    error::{Error, Result},
    frame_format::decode_lines,
    playback::{Direction, FrameRenderer, PlaybackController},
    skeleton::{Frame, FrameSequence, Landmark},
    storage::{FileStorage, Storage},
    timer::{PeriodicTimer, SharedClock, SystemClock},
};
use log::{debug, info, warn};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// User-facing status messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A gesture cycle completed
    CycleDetected(u32),
    /// The cycle watchdog expired
    TimedOut,
    /// Recording was requested without a usable name
    MissingFileName,
    /// A recording was opened
    RecordingStarted(String),
    /// A recording was closed
    RecordingStopped(StopReason),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected(n) => write!(f, "Cycle {n} Detected."),
            Self::TimedOut => write!(f, "Time out"),
            Self::MissingFileName => write!(f, "Please provide a file name"),
            Self::RecordingStarted(destination) => write!(f, "Recording started: {destination}"),
            Self::RecordingStopped(reason) => write!(f, "Recording {reason}"),
        }
    }
}

/// Outcome of one acquisition cycle of a frame source
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    /// A tracked subject was seen
    Tracked(Frame),
    /// The sensor delivered a frame without a tracked subject
    NoSubject,
    /// The source has no more frames
    Ended,
}

/// Something that delivers one frame per acquisition cycle
pub trait FrameSource {
    /// Acquire the next frame
    fn acquire(&mut self) -> Acquisition;
}

/// Replays a recorded sequence as if it came from a sensor
#[derive(Debug)]
pub struct RecordedSource {
    frames: std::vec::IntoIter<Frame>,
}

impl RecordedSource {
    /// Replay `sequence` from its first frame
    #[must_use]
    pub fn new(sequence: FrameSequence) -> Self {
        Self {
            frames: sequence.into_frames().into_iter(),
        }
    }
}

impl FrameSource for RecordedSource {
    fn acquire(&mut self) -> Acquisition {
        self.frames.next().map_or(Acquisition::Ended, Acquisition::Tracked)
    }
}

/// Live path: frames → detector → capture session
pub struct CapturePipeline {
    detector: CycleDetector,
    session: CaptureSession,
    notifications: Vec<Notification>,
}

impl CapturePipeline {
    /// Create a pipeline writing recordings to `storage`
    #[must_use]
    pub fn new(config: &Config, storage: Box<dyn Storage>, clock: SharedClock) -> Self {
        Self {
            detector: CycleDetector::new(&config.detector, clock),
            session: CaptureSession::new(&config.capture, storage),
            notifications: Vec::new(),
        }
    }

    /// Open a recording. The cycle count restarts so the warm-up applies to
    /// the new recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] (and queues [`Notification::MissingFileName`])
    /// for an empty or placeholder name, or an I/O error if the output cannot be opened
    pub fn start_recording(&mut self, name: &str, exercise: Option<&str>, weight: Option<&str>) -> Result<String> {
        match self.session.start_labeled(name, exercise, weight) {
            Ok(destination) => {
                self.detector.reset();
                self.notifications
                    .push(Notification::RecordingStarted(destination.clone()));
                Ok(destination)
            }
            Err(e @ Error::InvalidName(_)) => {
                warn!("Recording not started: {}", e);
                self.notifications.push(Notification::MissingFileName);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the current recording, if any
    pub fn stop_recording(&mut self) {
        if self.session.stop() {
            self.notifications
                .push(Notification::RecordingStopped(StopReason::User));
        }
    }

    /// Handle one acquisition cycle
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a persisted frame cannot be written
    pub fn process(&mut self, acquisition: &Acquisition) -> Result<()> {
        let Acquisition::Tracked(frame) = acquisition else {
            return self.poll();
        };

        self.detector.analyze(frame);
        self.dispatch_events();

        if self.session.offer(frame, self.detector.cycle_count())? == OfferOutcome::Stopped {
            self.notifications
                .push(Notification::RecordingStopped(StopReason::Complete));
        }
        Ok(())
    }

    /// Check the watchdog between frames
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` to match [`CapturePipeline::process`]
    pub fn poll(&mut self) -> Result<()> {
        self.detector.poll();
        self.dispatch_events();
        Ok(())
    }

    fn dispatch_events(&mut self) {
        for event in self.detector.take_events() {
            match event {
                CycleEvent::Started => {}
                CycleEvent::CycleCompleted(n) => self.notifications.push(Notification::CycleDetected(n)),
                CycleEvent::TimedOut => {
                    self.notifications.push(Notification::TimedOut);
                    if let Some(reason) = self.session.handle_event(event) {
                        self.notifications.push(Notification::RecordingStopped(reason));
                    }
                }
            }
        }
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// The detector
    #[must_use]
    pub fn detector(&self) -> &CycleDetector {
        &self.detector
    }

    /// The capture session
    #[must_use]
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }
}

/// Review path: recorded file → playback → detector on scrub
pub struct ReviewSession {
    playback: PlaybackController,
    detector: CycleDetector,
}

impl ReviewSession {
    /// Create a review session with nothing loaded
    #[must_use]
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        Self {
            playback: PlaybackController::new(&config.playback, clock.clone()),
            detector: CycleDetector::new(&config.detector, clock),
        }
    }

    /// Load a recording and restart cycle analysis
    ///
    /// # Errors
    ///
    /// Returns an I/O or parse error; the previous recording stays loaded
    pub fn load(&mut self, storage: &dyn Storage, name: &str) -> Result<usize> {
        let count = self.playback.load(storage, name)?;
        self.detector.reset();
        Ok(count)
    }

    /// Jump to `position` and re-analyse that frame. Returns the detector's events.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `position` is not playable
    pub fn scrub(&mut self, position: usize) -> Result<Vec<CycleEvent>> {
        self.playback.on_external_scrub(position, &mut self.detector)?;
        Ok(self.detector.take_events())
    }

    /// Scrub through every playable frame in order and return the number of
    /// cycles the detector completed
    ///
    /// # Errors
    ///
    /// Propagates scrub errors
    pub fn analyze_all(&mut self) -> Result<u32> {
        self.detector.reset();
        let Some(last) = self.playback.last_index() else {
            return Ok(0);
        };

        let mut completed = 0;
        for position in 0..=last {
            for event in self.scrub(position)? {
                match event {
                    CycleEvent::CycleCompleted(n) => {
                        completed += 1;
                        info!("Cycle {} Detected. (frame {})", n, position);
                    }
                    CycleEvent::TimedOut => info!("Time out (frame {})", position),
                    CycleEvent::Started => {}
                }
            }
        }
        Ok(completed)
    }

    /// The playback controller
    #[must_use]
    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Mutable access to the playback controller
    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    /// The detector
    #[must_use]
    pub fn detector(&self) -> &CycleDetector {
        &self.detector
    }
}

/// Renderer that reports frames through the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    rendered: usize,
}

impl LogRenderer {
    /// Frames rendered so far
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl FrameRenderer for LogRenderer {
    fn render(&mut self, frame: &Frame, index: usize) {
        self.rendered += 1;
        let head = frame.landmark(Landmark::Head);
        debug!("Frame {}: head at ({:.3}, {:.3}, {:.3})", index, head.x, head.y, head.z);
    }
}

fn storage_for(path: &Path) -> Result<(FileStorage, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    Ok((FileStorage::new(dir), name.to_string()))
}

fn report(notifications: Vec<Notification>) {
    for notification in notifications {
        info!("{}", notification);
    }
}

fn sleep_until(next: Option<Duration>) {
    if let Some(wait) = next {
        std::thread::sleep(wait);
    }
}

/// Replay `input` at the sensor rate through the capture pipeline, recording
/// into the configured output directory. Returns the number of frames persisted.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, the name is invalid,
/// or the output cannot be written
pub fn run_record(
    config: &Config,
    input: &Path,
    name: &str,
    exercise: Option<&str>,
    weight: Option<&str>,
) -> Result<usize> {
    let (input_storage, input_name) = storage_for(input)?;
    let sequence = decode_lines(&input_storage.read_all_lines(&input_name)?)?;
    info!("Replaying {} frames from {}", sequence.len(), input.display());

    let clock = SystemClock::shared();
    let storage = FileStorage::new(&config.capture.output_dir);
    let mut pipeline = CapturePipeline::new(config, Box::new(storage), clock.clone());
    let started = pipeline.start_recording(name, exercise, weight);
    report(pipeline.take_notifications());
    started?;

    let mut source = RecordedSource::new(sequence);
    let mut sensor = PeriodicTimer::new(clock, config.sensor.frame_interval()?);
    sensor.arm();

    while pipeline.session().is_recording() {
        if !sensor.take_due() {
            pipeline.poll()?;
            sleep_until(sensor.until_next());
            continue;
        }
        let acquisition = source.acquire();
        if acquisition == Acquisition::Ended {
            info!("End of input reached");
            pipeline.stop_recording();
        } else {
            pipeline.process(&acquisition)?;
        }
        report(pipeline.take_notifications());
    }
    report(pipeline.take_notifications());

    Ok(pipeline.session().frames_written())
}

/// Play a recording to the end (or start, when reversed). Returns the number
/// of frames rendered.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or the rate is invalid
pub fn run_play(config: &Config, file: &Path, rate: Option<f64>, reverse: bool) -> Result<usize> {
    let (storage, name) = storage_for(file)?;
    let mut playback = PlaybackController::new(&config.playback, SystemClock::shared());
    if reverse {
        playback.reverse();
    }
    playback.load(&storage, &name)?;
    if let Some(rate) = rate {
        playback.set_rate(rate)?;
    }

    let mut renderer = LogRenderer::default();
    if !playback.play() {
        warn!("Nothing to play in {}", file.display());
        return Ok(0);
    }
    info!(
        "Playing {} at {} fps ({})",
        file.display(),
        playback.rate(),
        if playback.direction() == Direction::Forward { "forward" } else { "backward" }
    );
    while playback.is_running() {
        sleep_until(playback.until_next_tick());
        playback.poll(&mut renderer);
    }

    Ok(renderer.rendered())
}

/// Scrub through a recording and count the cycles it contains
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded
pub fn run_analyze(config: &Config, file: &Path) -> Result<u32> {
    let (storage, name) = storage_for(file)?;
    let mut review = ReviewSession::new(config, SystemClock::shared());
    review.load(&storage, &name)?;
    let cycles = review.analyze_all()?;
    info!("{} contains {} complete cycles", file.display(), cycles);
    Ok(cycles)
}
