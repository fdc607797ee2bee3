//! Recognition result and voice activity types.
//!
//! These are the values exchanged with the upstream recognition engine and
//! emitted downstream. Every value carries an originating [`Timestamp`]: the
//! engine's estimate of when the described speech happened, not when the
//! value was computed.

use crate::audio::AudioSegment;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An alternative interpretation of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternate {
    /// The alternative text.
    pub text: String,
    /// Engine confidence for this alternative, when reported.
    pub confidence: Option<f32>,
}

impl Alternate {
    /// Creates a new alternate.
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A single recognition result received from the upstream engine, or a merged
/// utterance produced by the accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized text, possibly empty.
    pub text: String,
    /// Engine confidence in [0, 1].
    pub confidence: f32,
    /// Alternative interpretations, highest ranked first.
    pub alternates: Vec<Alternate>,
    /// The PCM segment this result was decoded from.
    pub audio: AudioSegment,
    /// Span of audio the result covers. Upstream engines omit this on
    /// partial hypotheses.
    pub duration: Option<Duration>,
    /// True for committed results, false for in-flight hypotheses.
    pub is_final: bool,
    /// Estimated time the described speech ended.
    pub originating_time: Timestamp,
}

impl RecognitionResult {
    /// Creates a final (committed) recognition result.
    pub fn new_final(
        text: impl Into<String>,
        confidence: f32,
        audio: AudioSegment,
        duration: Option<Duration>,
        originating_time: Timestamp,
    ) -> Self {
        Self {
            text: text.into(),
            confidence,
            alternates: Vec::new(),
            audio,
            duration,
            is_final: true,
            originating_time,
        }
    }

    /// Creates a partial (in-flight) hypothesis.
    pub fn new_partial(
        text: impl Into<String>,
        confidence: f32,
        audio: AudioSegment,
        originating_time: Timestamp,
    ) -> Self {
        Self {
            text: text.into(),
            confidence,
            alternates: Vec::new(),
            audio,
            duration: None,
            is_final: false,
            originating_time,
        }
    }

    /// Attaches alternative interpretations.
    pub fn with_alternates(mut self, alternates: Vec<Alternate>) -> Self {
        self.alternates = alternates;
        self
    }

    /// Attaches the covered audio span.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Estimated time the described speech started, when the covered span is
    /// known. The originating time marks the end of the span.
    pub fn start_time(&self) -> Option<Timestamp> {
        self.duration
            .map(|duration| self.originating_time.minus(duration))
    }

    /// Estimated time the described speech ended.
    pub fn end_time(&self) -> Timestamp {
        self.originating_time
    }
}

/// A voice activity observation from the upstream detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceActivity {
    /// Whether speech energy is currently present.
    pub active: bool,
    /// Detector level (0.0 = silence, 1.0 = full speech), when reported.
    pub level: Option<f32>,
    /// Estimated time of the observation.
    pub time: Timestamp,
}

impl VoiceActivity {
    /// Creates an observation without level information.
    pub fn new(active: bool, time: Timestamp) -> Self {
        Self {
            active,
            level: None,
            time,
        }
    }

    /// Creates an observation carrying the detector level.
    pub fn with_level(active: bool, level: f32, time: Timestamp) -> Self {
        Self {
            active,
            level: Some(level),
            time,
        }
    }
}

/// A speech boundary event derived from voice activity transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechActivity {
    /// Voice activity transitioned from silence to speech.
    Started { time: Timestamp },
    /// Voice activity transitioned from speech to silence.
    Stopped { time: Timestamp },
}

impl SpeechActivity {
    /// The estimated time of the transition.
    pub fn time(&self) -> Timestamp {
        match self {
            SpeechActivity::Started { time } | SpeechActivity::Stopped { time } => *time,
        }
    }
}
