//! Event types flowing through the pipeline.
//!
//! The three upstream feeds (final results, partial hypotheses, voice
//! activity) are multiplexed into one ordered [`RecognizerEvent`] stream so
//! the merger station consumes a single serialized feed. Outputs leave the
//! pipeline as [`Stamped`] values carrying their reconciled originating time.

use crate::result::{RecognitionResult, SpeechActivity, VoiceActivity};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Output stream names, as registered with the timestamp reconciler.
pub mod streams {
    /// Merged utterances.
    pub const UTTERANCES: &str = "utterances";
    /// Live partial hypotheses.
    pub const PARTIAL_HYPOTHESES: &str = "partial-hypotheses";
    /// Speech started/stopped transitions.
    pub const SPEECH_ACTIVITY: &str = "speech-activity";
    /// Audio level samples.
    pub const AUDIO_LEVELS: &str = "audio-levels";
}

/// Reconciliation groups. Streams in the same group share one monotonicity
/// watermark, so their posted times are strictly increasing across both.
pub mod groups {
    /// Utterances and partial hypotheses.
    pub const RECOGNITION_RESULTS: &str = "recognition-results";
    /// Speech activity transitions.
    pub const SPEECH_EVENTS: &str = "speech-events";
    /// Audio level samples.
    pub const AUDIO_EVENTS: &str = "audio-events";
}

/// An input event delivered to the merger station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognizerEvent {
    /// A committed recognition result.
    Final { result: RecognitionResult },
    /// An in-flight hypothesis.
    Partial { result: RecognitionResult },
    /// A voice activity observation.
    Activity { activity: VoiceActivity },
}

impl RecognizerEvent {
    /// Returns true if this is a final result.
    pub fn is_final(&self) -> bool {
        matches!(self, RecognizerEvent::Final { .. })
    }

    /// Returns true if this is a partial hypothesis.
    pub fn is_partial(&self) -> bool {
        matches!(self, RecognizerEvent::Partial { .. })
    }

    /// Returns true if this is a voice activity observation.
    pub fn is_activity(&self) -> bool {
        matches!(self, RecognizerEvent::Activity { .. })
    }

    /// The upstream-estimated time of the event.
    pub fn time(&self) -> Timestamp {
        match self {
            RecognizerEvent::Final { result } | RecognizerEvent::Partial { result } => {
                result.originating_time
            }
            RecognizerEvent::Activity { activity } => activity.time,
        }
    }

    /// Serialize the event to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an event from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// An output event from the async stream merger.
///
/// The threaded pipeline hands out one typed channel per output stream; the
/// async merger multiplexes the same four streams into this tagged enum so a
/// single task can consume everything in arrival order. The `time` on each
/// variant is the reconciled originating time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    /// A merged utterance.
    Utterance {
        result: RecognitionResult,
        time: Timestamp,
    },
    /// A live partial hypothesis.
    Partial {
        result: RecognitionResult,
        time: Timestamp,
    },
    /// A speech boundary transition.
    Speech {
        activity: SpeechActivity,
        time: Timestamp,
    },
    /// An audio level sample.
    Level { level: f32, time: Timestamp },
}

impl OutputEvent {
    /// The reconciled originating time of the event.
    pub fn time(&self) -> Timestamp {
        match self {
            OutputEvent::Utterance { time, .. }
            | OutputEvent::Partial { time, .. }
            | OutputEvent::Speech { time, .. }
            | OutputEvent::Level { time, .. } => *time,
        }
    }

    /// The name of the stream this event belongs to.
    pub fn stream(&self) -> &'static str {
        match self {
            OutputEvent::Utterance { .. } => streams::UTTERANCES,
            OutputEvent::Partial { .. } => streams::PARTIAL_HYPOTHESES,
            OutputEvent::Speech { .. } => streams::SPEECH_ACTIVITY,
            OutputEvent::Level { .. } => streams::AUDIO_LEVELS,
        }
    }

    /// Serialize the event to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an event from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// A value paired with its reconciled originating time.
///
/// The time here is the adjusted one the reconciler assigned, which may be a
/// tick or more past the upstream estimate the value arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    /// The carried value.
    pub value: T,
    /// Reconciled originating time.
    pub time: Timestamp,
}

impl<T> Stamped<T> {
    /// Pairs a value with its reconciled time.
    pub fn new(value: T, time: Timestamp) -> Self {
        Self { value, time }
    }
}
