//! utterflow - Utterance merging for streaming speech recognition
//!
//! Joins fragmented recognition results across voice activity boundaries and
//! keeps every output stream's originating times strictly increasing.

// Enforce error handling discipline in library code
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod result;
pub mod streaming;
pub mod time;
pub mod timing;

// Core components
pub use merge::{AccumulatorConfig, UtteranceAccumulator};
pub use timing::{AdjustPolicy, TimestampReconciler};

// Pipeline
pub use pipeline::emitters::Outputs;
pub use pipeline::feed::RecognizerFeed;
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};

// Async layer
pub use streaming::merger::{StreamMerger, StreamMergerConfig};

// Error handling
pub use error::{Result, UtterflowError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;

// Event and data types
pub use audio::AudioSegment;
pub use pipeline::events::{OutputEvent, RecognizerEvent, Stamped};
pub use result::{Alternate, RecognitionResult, SpeechActivity, VoiceActivity};
pub use time::{Clock, MockClock, SystemClock, Timestamp};
