//! Threaded pipeline for utterance merging.
//!
//! Runs the merger station on its own thread, connected to the outside world
//! by bounded crossbeam channels for backpressure. Events enter through a
//! [`RecognizerFeed`] and leave on the typed [`Outputs`] streams with
//! reconciled originating times.

pub mod emitters;
pub mod error;
pub mod events;
pub mod feed;
pub mod merger_station;
pub mod orchestrator;
pub mod station;

pub use emitters::{EmitterBank, Outputs};
pub use error::{ErrorReporter, LogReporter, StationError};
pub use events::{OutputEvent, RecognizerEvent, Stamped, groups, streams};
pub use feed::RecognizerFeed;
pub use merger_station::MergerStation;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use station::{Station, StationRunner};
