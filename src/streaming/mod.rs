//! Async merging for tokio-based hosts.
//!
//! Runs the merger as a task instead of a thread:
//! ```text
//! ┌────────────┐  RecognizerEvent   ┌──────────────┐  OutputEvent
//! │ Recognizer │───(tokio mpsc)───▶│ StreamMerger │───(tokio mpsc)───▶ Consumer
//! │   + VAD    │                    │  (one task)  │
//! └────────────┘                    └──────────────┘
//! ```
//! Unlike the threaded pipeline's typed per-stream channels, the four output
//! streams are multiplexed into one tagged [`OutputEvent`] sequence.
//!
//! [`OutputEvent`]: crate::pipeline::events::OutputEvent

pub mod merger;

pub use merger::{StreamMerger, StreamMergerConfig};
