//! Recording sessions gated by the completed-cycle count.
//!
//! Frames offered while the subject is still warming up are dropped, frames
//! from the capture window are appended to the output, and the session
//! closes itself once the window has passed.

use crate::config::CaptureConfig;
use crate::cycle_detector::CycleEvent;
use crate::frame_format::encode_frame;
use crate::skeleton::Frame;
use crate::storage::{Storage, WritableSink};
use crate::{Error, Result};
use log::{debug, info, warn};
use std::fmt;

/// What the gate decides for a frame at a given cycle count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Still warming up
    Discard,
    /// Inside the capture window
    Persist,
    /// Window has passed; recording should end
    AutoStop,
}

/// Cycle-count window deciding which frames are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureGate {
    warmup_cycles: u32,
    last_capture_cycle: u32,
}

impl CaptureGate {
    /// Keep frames while `warmup_cycles < count <= last_capture_cycle`
    #[must_use]
    pub fn new(warmup_cycles: u32, last_capture_cycle: u32) -> Self {
        Self {
            warmup_cycles,
            last_capture_cycle,
        }
    }

    /// Classify a frame by the cycle count at which it was offered
    #[must_use]
    pub fn decide(&self, cycle_count: u32) -> GateDecision {
        if cycle_count <= self.warmup_cycles {
            GateDecision::Discard
        } else if cycle_count <= self.last_capture_cycle {
            GateDecision::Persist
        } else {
            GateDecision::AutoStop
        }
    }
}

/// Why a recording ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Explicit stop request
    User,
    /// The capture window was filled
    Complete,
    /// The cycle watchdog expired
    TimedOut,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "stopped"),
            Self::Complete => write!(f, "stopped: capture complete"),
            Self::TimedOut => write!(f, "stopped: timed out"),
        }
    }
}

/// Result of offering one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// No recording in progress
    Ignored,
    /// Dropped by the gate
    Discarded,
    /// Appended to the output
    Persisted,
    /// The gate ended the recording
    Stopped,
}

/// Owns the output of one recording at a time
pub struct CaptureSession {
    storage: Box<dyn Storage>,
    gate: CaptureGate,
    extension: String,
    placeholder_names: Vec<String>,
    sink: Option<Box<dyn WritableSink>>,
    destination: Option<String>,
    frames_written: usize,
}

impl CaptureSession {
    /// Create an idle session writing through `storage`
    #[must_use]
    pub fn new(config: &CaptureConfig, storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            gate: CaptureGate::new(config.warmup_cycles, config.last_capture_cycle),
            extension: config.extension.clone(),
            placeholder_names: config.placeholder_names.clone(),
            sink: None,
            destination: None,
            frames_written: 0,
        }
    }

    /// Compose a destination from the user-entered name plus optional
    /// exercise and weight labels
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` is empty or a placeholder
    pub fn destination_name(&self, name: &str, exercise: Option<&str>, weight: Option<&str>) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.placeholder_names.iter().any(|p| p == trimmed) {
            return Err(Error::InvalidName(name.to_string()));
        }

        Ok(format!(
            "{trimmed}{}{}.{}",
            exercise.unwrap_or_default().trim(),
            weight.unwrap_or_default().trim(),
            self.extension
        ))
    }

    /// Begin a recording named `name`
    ///
    /// # Errors
    ///
    /// See [`CaptureSession::start_labeled`]
    pub fn start(&mut self, name: &str) -> Result<String> {
        self.start_labeled(name, None, None)
    }

    /// Begin a recording, closing any recording still open. Returns the destination name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] without touching the current recording if the
    /// name is empty or a placeholder, or an I/O error if the output cannot be opened
    pub fn start_labeled(&mut self, name: &str, exercise: Option<&str>, weight: Option<&str>) -> Result<String> {
        let destination = self.destination_name(name, exercise, weight)?;

        self.release();
        let sink = self.storage.open(&destination)?;
        self.sink = Some(sink);
        self.destination = Some(destination.clone());
        self.frames_written = 0;

        info!("Recording started: {}", destination);
        Ok(destination)
    }

    /// Offer a frame together with the current completed-cycle count
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the frame cannot be written; the recording is closed
    pub fn offer(&mut self, frame: &Frame, cycle_count: u32) -> Result<OfferOutcome> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(OfferOutcome::Ignored);
        };

        match self.gate.decide(cycle_count) {
            GateDecision::Discard => Ok(OfferOutcome::Discarded),
            GateDecision::Persist => {
                if let Err(e) = sink.write_line(&encode_frame(frame)) {
                    warn!("Write failed, closing recording: {}", e);
                    self.release();
                    return Err(e);
                }
                self.frames_written += 1;
                Ok(OfferOutcome::Persisted)
            }
            GateDecision::AutoStop => {
                self.finish(StopReason::Complete);
                Ok(OfferOutcome::Stopped)
            }
        }
    }

    /// Route a detector event. Returns the stop reason if the event ended a recording.
    pub fn handle_event(&mut self, event: CycleEvent) -> Option<StopReason> {
        match event {
            CycleEvent::TimedOut if self.is_recording() => {
                self.finish(StopReason::TimedOut);
                Some(StopReason::TimedOut)
            }
            _ => None,
        }
    }

    /// End the recording if one is open. Safe to call repeatedly.
    /// Returns `true` if a recording was actually closed.
    pub fn stop(&mut self) -> bool {
        if self.is_recording() {
            self.finish(StopReason::User);
            true
        } else {
            false
        }
    }

    fn finish(&mut self, reason: StopReason) {
        info!(
            "Recording {} ({} frames written): {}",
            self.destination.as_deref().unwrap_or("<none>"),
            self.frames_written,
            reason
        );
        self.release();
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            debug!("Closing recording output");
            if let Err(e) = sink.close() {
                warn!("Failed to close recording output: {}", e);
            }
        }
    }

    /// Whether a recording is open
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.sink.is_some()
    }

    /// Frames persisted by the current (or most recent) recording
    #[must_use]
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Destination of the current (or most recent) recording
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// The gate in use
    #[must_use]
    pub fn gate(&self) -> CaptureGate {
        self.gate
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
