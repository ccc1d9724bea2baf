//! Error types for the pose-cycle library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Recording destination name is empty or still the placeholder text
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// Playback rate is not a positive number within the allowed ceiling
    #[error("Invalid playback rate: {0} frames per second")]
    InvalidRate(f64),

    /// Scrub target outside the playable range
    #[error("Invalid position {position} for a playable range of {len} frames")]
    InvalidPosition {
        /// Requested frame index
        position: usize,
        /// Number of playable frames
        len: usize,
    },

    /// A serialized frame record could not be decoded
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number within the record
        line: usize,
        /// What went wrong
        message: String,
    },

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the error is a recoverable validation failure (bad name or rate)
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_) | Self::InvalidRate(_) | Self::InvalidPosition { .. }
        )
    }
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
