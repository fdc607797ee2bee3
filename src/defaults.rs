//! Default configuration constants for utterflow.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition pipelines; interstitial
/// silence synthesized between utterance fragments uses this rate unless the
/// incoming audio says otherwise.
pub const SAMPLE_RATE: u32 = 16000;

/// Default separator inserted between fragment texts when merging.
pub const WORD_SEPARATOR: &str = " ";

/// Default silence duration in milliseconds before pending fragments are
/// flushed as a complete utterance.
///
/// 500ms allows for recognizer segmentation pauses without splitting one
/// spoken sentence into several utterances.
pub const MIN_SILENCE_MS: u64 = 500;

/// Default cap on the number of alternates attached to a merged utterance.
///
/// The alternate cross-product grows multiplicatively with each merged
/// fragment; enumeration stops once this many combinations exist.
pub const MAX_ALTERNATES: usize = 8;

/// Default bound on pipeline channel capacity.
///
/// Recognition results arrive at speech cadence, so a small bound is enough;
/// it exists to surface a stalled consumer instead of buffering without limit.
pub const CHANNEL_CAPACITY: usize = 64;
