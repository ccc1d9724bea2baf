//! Constants used throughout the application

use std::time::Duration;

/// Number of landmarks in the reference skeleton layout
pub const NUM_LANDMARKS: usize = 16;

/// Coordinates written per landmark (X, Y, Z)
pub const COORDS_PER_LANDMARK: usize = 3;

/// Maximum horizontal wrist distance for the arms to count as close
pub const DEFAULT_ARMS_CLOSE_THRESHOLD: f64 = 0.4;

/// Maximum horizontal ankle distance for the feet to count as close
pub const DEFAULT_FEET_CLOSE_THRESHOLD: f64 = 0.2;

/// Seconds a started cycle may take before the watchdog resets it
pub const DEFAULT_CYCLE_TIMEOUT_SECS: f64 = 2.5;

/// Completed cycles discarded before recording begins
pub const DEFAULT_WARMUP_CYCLES: u32 = 5;

/// Last cycle count whose frames are still persisted
pub const DEFAULT_LAST_CAPTURE_CYCLE: u32 = 15;

/// Default playback and sensor rate in frames per second
pub const DEFAULT_FPS: f64 = 30.0;

/// Upper bound accepted by `set_rate`
pub const MAX_PLAYBACK_RATE: f64 = 120.0;

/// Longest tick interval accepted for playback and sensor timers (one frame a day)
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Frames at the end of a recording excluded from the playable range
pub const DEFAULT_TAIL_TRIM: usize = 1;

/// File extension for recordings
pub const RECORDING_EXTENSION: &str = "txt";

/// Text a name field shows before the user types anything
pub const PLACEHOLDER_NAMES: [&str; 2] = ["Dateiname", "filename"];
