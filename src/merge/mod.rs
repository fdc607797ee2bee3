//! Voice-activity-gated utterance accumulation.
//!
//! Recognition engines segment speech conservatively, so one spoken sentence
//! often arrives as several final results. The accumulator collects those
//! fragments and emits one merged utterance per silence-terminated turn:
//! ```text
//! finals ───────▶┌─────────────┐
//! partials ─────▶│ accumulator │────▶ merged final + live partials
//! voice activity▶└─────────────┘
//! ```

pub mod accumulator;
pub mod alternates;

pub use accumulator::{AccumulatorConfig, UtteranceAccumulator};
