//! Configuration management for the pose-cycle application

use crate::constants::{
    DEFAULT_ARMS_CLOSE_THRESHOLD, DEFAULT_CYCLE_TIMEOUT_SECS, DEFAULT_FEET_CLOSE_THRESHOLD, DEFAULT_FPS,
    DEFAULT_LAST_CAPTURE_CYCLE, DEFAULT_TAIL_TRIM, DEFAULT_WARMUP_CYCLES, MAX_PLAYBACK_RATE, MAX_TICK_INTERVAL,
    PLACEHOLDER_NAMES, RECORDING_EXTENSION,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gesture-cycle detection
    pub detector: DetectorConfig,

    /// Recording gate and destination
    pub capture: CaptureConfig,

    /// Playback of recorded sequences
    pub playback: PlaybackConfig,

    /// Live frame source
    pub sensor: SensorConfig,
}

/// Cycle detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Wrists closer than this (horizontally) count as "arms close"
    pub arms_close_threshold: f64,

    /// Ankles closer than this (horizontally) count as "feet close"
    pub feet_close_threshold: f64,

    /// Seconds a started cycle may run before the watchdog resets the count
    pub timeout_secs: f64,
}

/// Capture gate and output naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Completed cycles to discard before persisting frames
    pub warmup_cycles: u32,

    /// Last cycle count whose frames are persisted; recording stops beyond it
    pub last_capture_cycle: u32,

    /// Directory recordings are written to
    pub output_dir: PathBuf,

    /// File extension appended to destination names
    pub extension: String,

    /// Names treated as "no name given"
    pub placeholder_names: Vec<String>,
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial frames per second
    pub default_rate: f64,

    /// Highest accepted frames per second
    pub max_rate: f64,

    /// Frames at the end of a recording left out of the playable range.
    /// The backward rewind point of `stop()` is the last playable frame, so it
    /// moves with this value (`N - 1 - tail_trim`).
    pub tail_trim: usize,
}

/// Frame source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Frames per second delivered by the source
    pub frame_rate: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            arms_close_threshold: DEFAULT_ARMS_CLOSE_THRESHOLD,
            feet_close_threshold: DEFAULT_FEET_CLOSE_THRESHOLD,
            timeout_secs: DEFAULT_CYCLE_TIMEOUT_SECS,
        }
    }
}

impl DetectorConfig {
    /// Watchdog duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_CYCLE_TIMEOUT_SECS))
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            warmup_cycles: DEFAULT_WARMUP_CYCLES,
            last_capture_cycle: DEFAULT_LAST_CAPTURE_CYCLE,
            output_dir: PathBuf::from("."),
            extension: RECORDING_EXTENSION.to_string(),
            placeholder_names: PLACEHOLDER_NAMES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_rate: DEFAULT_FPS,
            max_rate: MAX_PLAYBACK_RATE,
            tail_trim: DEFAULT_TAIL_TRIM,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self { frame_rate: DEFAULT_FPS }
    }
}

impl SensorConfig {
    /// Time between two delivered frames
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the frame rate is not positive or its
    /// interval exceeds [`MAX_TICK_INTERVAL`]
    pub fn frame_interval(&self) -> Result<Duration> {
        if !(self.frame_rate > 0.0) {
            return Err(Error::ConfigError("Sensor frame rate must be greater than 0".to_string()));
        }
        Duration::try_from_secs_f64(1.0 / self.frame_rate)
            .ok()
            .filter(|interval| *interval <= MAX_TICK_INTERVAL)
            .ok_or_else(|| Error::ConfigError(format!("Sensor frame rate {} is too small", self.frame_rate)))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Detector thresholds
        if !(self.detector.arms_close_threshold > 0.0) {
            return Err(Error::ConfigError(
                "Arms-close threshold must be greater than 0".to_string(),
            ));
        }
        if !(self.detector.feet_close_threshold > 0.0) {
            return Err(Error::ConfigError(
                "Feet-close threshold must be greater than 0".to_string(),
            ));
        }
        if !(self.detector.timeout_secs > 0.0) || Duration::try_from_secs_f64(self.detector.timeout_secs).is_err() {
            return Err(Error::ConfigError(
                "Cycle timeout must be a positive number of seconds".to_string(),
            ));
        }

        // Capture gate
        if self.capture.warmup_cycles >= self.capture.last_capture_cycle {
            return Err(Error::ConfigError(format!(
                "Warm-up cycles ({}) must be below the last capture cycle ({})",
                self.capture.warmup_cycles, self.capture.last_capture_cycle
            )));
        }
        if self.capture.extension.is_empty() {
            return Err(Error::ConfigError("Recording extension must not be empty".to_string()));
        }

        // Playback
        if !(self.playback.max_rate > 0.0) || self.playback.max_rate > MAX_PLAYBACK_RATE {
            return Err(Error::ConfigError(format!(
                "Maximum playback rate must be between 0 and {MAX_PLAYBACK_RATE}"
            )));
        }
        if !(self.playback.default_rate > 0.0)
            || self.playback.default_rate > self.playback.max_rate
            || Duration::try_from_secs_f64(1.0 / self.playback.default_rate)
                .map_or(true, |interval| interval > MAX_TICK_INTERVAL)
        {
            return Err(Error::ConfigError(format!(
                "Default playback rate must be between 0 and {}",
                self.playback.max_rate
            )));
        }

        if !self.sensor.frame_rate.is_finite() {
            return Err(Error::ConfigError("Sensor frame rate must be greater than 0".to_string()));
        }
        self.sensor.frame_interval()?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# pose-cycle configuration

# Gesture-cycle detection
detector:
  arms_close_threshold: 0.4
  feet_close_threshold: 0.2
  timeout_secs: 2.5

# Recording gate: discard up to warmup_cycles, keep up to last_capture_cycle
capture:
  warmup_cycles: 5
  last_capture_cycle: 15
  output_dir: "."
  extension: "txt"
  placeholder_names: ["Dateiname", "filename"]

# Playback
playback:
  default_rate: 30.0
  max_rate: 120.0
  tail_trim: 1

# Live frame source
sensor:
  frame_rate: 30.0
"#;
