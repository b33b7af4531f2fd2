//! Error types for clipdeck
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the clipdeck engine
#[derive(Error, Debug)]
pub enum Error {
    /// Audio output device or stream errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Rejected playback trigger (empty clip, empty slice list, ...)
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),

    /// Engine lifecycle errors (thread spawn/join, invalid state for operation)
    #[error("Engine error: {0}")]
    Engine(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using clipdeck Error
pub type Result<T> = std::result::Result<T, Error>;
