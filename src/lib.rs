//! Gesture-cycle detection, gated capture and playback for skeletal pose streams.
//!
//! The library consumes a stream of skeleton frames (16 landmarks each) and:
//! - recognises jumping-jack cycles with a small state machine guarded by a
//!   timeout watchdog
//! - records only the settled part of an exercise, gated by the cycle count
//! - plays recordings back forwards or backwards at a configurable rate and
//!   re-analyses scrubbed frames
//!
//! # Examples
//!
//! ## Counting cycles
//!
//! ```
//! use pose_cycle::{
//!     config::DetectorConfig,
//!     cycle_detector::CycleDetector,
//!     skeleton::{Frame, Landmark},
//!     timer::SystemClock,
//! };
//! use nalgebra::Point3;
//!
//! let mut detector = CycleDetector::new(&DetectorConfig::default(), SystemClock::shared());
//!
//! // Arms raised above the head, wrists and ankles together
//! let mut up = Frame::zeroed();
//! up.set_landmark(Landmark::WristLeft, Point3::new(-0.05, 1.0, 2.0));
//! up.set_landmark(Landmark::WristRight, Point3::new(0.05, 1.0, 2.0));
//! up.set_landmark(Landmark::Head, Point3::new(0.0, 0.6, 2.0));
//!
//! // Arms down and apart, feet apart
//! let mut down = Frame::zeroed();
//! down.set_landmark(Landmark::Head, Point3::new(0.0, 0.6, 2.0));
//! down.set_landmark(Landmark::WristLeft, Point3::new(-0.6, 0.0, 2.0));
//! down.set_landmark(Landmark::WristRight, Point3::new(0.6, 0.0, 2.0));
//! down.set_landmark(Landmark::AnkleLeft, Point3::new(-0.3, -1.0, 2.0));
//! down.set_landmark(Landmark::AnkleRight, Point3::new(0.3, -1.0, 2.0));
//!
//! detector.analyze(&up);
//! detector.analyze(&down);
//! assert_eq!(detector.cycle_count(), 1);
//! ```
//!
//! ## Recording
//!
//! ```
//! use pose_cycle::{
//!     app::{Acquisition, CapturePipeline},
//!     config::Config,
//!     skeleton::Frame,
//!     storage::MemoryStorage,
//!     timer::SystemClock,
//! };
//!
//! # fn main() -> pose_cycle::Result<()> {
//! let storage = MemoryStorage::new();
//! let mut pipeline = CapturePipeline::new(&Config::default(), Box::new(storage.clone()), SystemClock::shared());
//! pipeline.start_recording("anna", Some("Hampelmann"), None)?;
//!
//! // Frames before the warm-up has passed are not persisted
//! pipeline.process(&Acquisition::Tracked(Frame::zeroed()))?;
//! assert_eq!(storage.lines("annaHampelmann.txt"), Some(vec![]));
//!
//! for notification in pipeline.take_notifications() {
//!     println!("{notification}");
//! }
//! # Ok(())
//! # }
//! ```

/// Skeleton landmarks, frames and sequences
pub mod skeleton;

/// Text record encoding of frames
pub mod frame_format;

/// Line-oriented storage backends
pub mod storage;

/// Monotonic clocks and cancellable timers
pub mod timer;

/// Gesture-cycle state machine with timeout watchdog
pub mod cycle_detector;

/// Cycle-gated recording sessions
pub mod capture_session;

/// Bidirectional, variable-rate playback with scrub support
pub mod playback;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Command-line interface definition
pub mod cli;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
