//! Error types and reporting for pipeline stations.

use crate::error::UtterflowError;
use std::fmt;

/// Errors that can occur during station processing.
#[derive(Debug, Clone)]
pub enum StationError {
    /// Recoverable error that allows the station to continue processing.
    Recoverable(String),
    /// Fatal error that requires the station to shut down.
    Fatal(String),
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StationError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

impl From<UtterflowError> for StationError {
    /// Contract violations stop the station; everything else is reported and
    /// processing continues.
    fn from(error: UtterflowError) -> Self {
        match error {
            UtterflowError::MissingDuration { .. }
            | UtterflowError::SampleRateMismatch { .. }
            | UtterflowError::UnregisteredStream { .. }
            | UtterflowError::DuplicateStream { .. }
            | UtterflowError::OutputClosed { .. } => StationError::Fatal(error.to_string()),
            other => StationError::Recoverable(other.to_string()),
        }
    }
}

/// Trait for reporting station errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a station.
    fn report(&self, station: &str, error: &StationError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        eprintln!("[{}] {}", station, error);
    }
}
