//! Error types for utterflow.

use crate::time::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtterflowError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Merge errors
    #[error("Recognition result at {time} has no audio duration, cannot reconstruct utterance audio")]
    MissingDuration { time: Timestamp },

    #[error("Sample rate mismatch in utterance audio: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    // Timing errors
    #[error("Stream {stream} was not registered with the timestamp reconciler")]
    UnregisteredStream { stream: String },

    #[error("Stream {stream} is already registered with the timestamp reconciler")]
    DuplicateStream { stream: String },

    // Pipeline errors
    #[error("Output stream {stream} is closed, receiver was dropped")]
    OutputClosed { stream: String },

    #[error("Pipeline is shut down, event feed is closed")]
    PipelineClosed,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, UtterflowError>;
