//! Utterance accumulator state machine.
//!
//! Collects final recognition fragments between voice activity boundaries
//! and flushes them as one merged utterance once silence has persisted past
//! the configured threshold and the recognizer has caught up with the last
//! voiced moment.

use crate::audio::AudioSegment;
use crate::defaults;
use crate::error::{Result, UtterflowError};
use crate::merge::alternates::{cross_product, join_non_empty};
use crate::result::{RecognitionResult, VoiceActivity};
use crate::time::{Clock, SystemClock, Timestamp};
use std::time::Duration;

/// Configuration for utterance accumulation.
#[derive(Debug, Clone)]
pub struct AccumulatorConfig {
    /// Silence that must elapse after the last voiced moment before the
    /// pending fragments are flushed as an utterance.
    pub min_silence: Duration,
    /// Cap on the number of combined alternates attached to a merged
    /// utterance.
    pub max_alternates: usize,
    /// Separator inserted between fragment texts.
    pub separator: String,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            min_silence: Duration::from_millis(defaults::MIN_SILENCE_MS),
            max_alternates: defaults::MAX_ALTERNATES,
            separator: defaults::WORD_SEPARATOR.to_string(),
        }
    }
}

/// Voice-activity-gated utterance accumulator.
///
/// All entry points must be called from a single thread; the component keeps
/// no locks. The clock supplies the current pipeline time for the
/// silence-elapsed comparison and is injectable for tests.
pub struct UtteranceAccumulator<C: Clock = SystemClock> {
    config: AccumulatorConfig,
    pending: Vec<RecognitionResult>,
    last_voiced_time: Option<Timestamp>,
    clock: C,
}

impl<C: Clock> UtteranceAccumulator<C> {
    /// Creates an accumulator with the given configuration and clock.
    pub fn with_clock(config: AccumulatorConfig, clock: C) -> Self {
        Self {
            config,
            pending: Vec::new(),
            last_voiced_time: None,
            clock,
        }
    }

    /// Appends a final fragment to the pending utterance. Produces no output;
    /// the fragment is held until a silence boundary flushes it.
    pub fn receive_final(&mut self, fragment: RecognitionResult) {
        self.pending.push(fragment);
    }

    /// Handles an in-flight hypothesis, returning the live partial to emit.
    ///
    /// With no pending fragments the hypothesis passes through verbatim.
    /// Otherwise a combined partial is synthesized from the pending texts
    /// plus the new hypothesis, so consumers see the whole utterance so far.
    /// Pending state is never mutated here.
    pub fn receive_partial(&mut self, partial: RecognitionResult) -> RecognitionResult {
        if self.pending.is_empty() {
            return partial;
        }

        let text = join_non_empty(
            self.pending
                .iter()
                .map(|fragment| fragment.text.as_str())
                .chain(std::iter::once(partial.text.as_str())),
            &self.config.separator,
        );
        let confidence = self
            .pending
            .iter()
            .map(|fragment| fragment.confidence)
            .chain(std::iter::once(partial.confidence))
            .fold(1.0f32, f32::min);

        RecognitionResult {
            text,
            confidence,
            alternates: Vec::new(),
            ..partial
        }
    }

    /// Handles a voice activity observation, returning a merged utterance
    /// when the observation closes one.
    ///
    /// Voiced observations only move the last-voiced watermark. An unvoiced
    /// observation flushes the pending fragments when all three hold:
    /// silence since the watermark exceeds the configured threshold, at
    /// least one fragment is pending, and the last pending fragment's time
    /// equals the watermark (no fragment is still in flight).
    pub fn receive_voice_activity(
        &mut self,
        activity: VoiceActivity,
    ) -> Result<Option<RecognitionResult>> {
        if activity.active {
            self.last_voiced_time = Some(activity.time);
            return Ok(None);
        }

        let Some(last_voiced) = self.last_voiced_time else {
            return Ok(None);
        };

        let silence_elapsed = self.clock.now().saturating_duration_since(last_voiced);
        if silence_elapsed <= self.config.min_silence {
            return Ok(None);
        }

        let caught_up = self
            .pending
            .last()
            .is_some_and(|fragment| fragment.originating_time == last_voiced);
        if !caught_up {
            return Ok(None);
        }

        self.flush(last_voiced).map(Some)
    }

    /// Number of fragments waiting for a silence boundary.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Time of the most recent voiced observation, if any.
    pub fn last_voiced_time(&self) -> Option<Timestamp> {
        self.last_voiced_time
    }

    /// Discards all pending fragments and voice activity bookkeeping.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_voiced_time = None;
    }

    /// Builds the merged utterance from the pending fragments and clears them.
    ///
    /// Merged text joins the non-empty fragment texts; confidence is the
    /// minimum across fragments; alternates are the capped cross-product.
    /// Audio is the fragment segments concatenated with silence covering each
    /// positive gap between one fragment's end and the next one's nominal
    /// start (originating time minus duration). Estimation noise can make a
    /// gap non-positive; no padding is inserted then and no samples are
    /// dropped. Total duration spans first start to last end.
    fn flush(&mut self, flush_time: Timestamp) -> Result<RecognitionResult> {
        let pending = std::mem::take(&mut self.pending);

        let text = join_non_empty(
            pending.iter().map(|fragment| fragment.text.as_str()),
            &self.config.separator,
        );
        let confidence = pending
            .iter()
            .map(|fragment| fragment.confidence)
            .fold(1.0f32, f32::min);
        let alternates =
            cross_product(&pending, &self.config.separator, self.config.max_alternates);

        let sample_rate = pending
            .first()
            .map_or(defaults::SAMPLE_RATE, |fragment| fragment.audio.sample_rate);
        let mut audio = AudioSegment::empty(sample_rate);
        let mut span_start: Option<Timestamp> = None;
        let mut span_end: Option<Timestamp> = None;
        for fragment in &pending {
            let duration = fragment.duration.ok_or(UtterflowError::MissingDuration {
                time: fragment.originating_time,
            })?;
            let start = fragment.originating_time.minus(duration);
            if let Some(end) = span_end {
                let gap = start.nanos_since(end);
                if gap > 0 {
                    audio.append_silence(Duration::from_nanos(gap as u64));
                }
            }
            audio.append(&fragment.audio)?;
            if span_start.is_none() {
                span_start = Some(start);
            }
            span_end = Some(fragment.originating_time);
        }
        let duration = match (span_start, span_end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        };

        Ok(RecognitionResult {
            text,
            confidence,
            alternates,
            audio,
            duration: Some(duration),
            is_final: true,
            originating_time: flush_time,
        })
    }
}

impl UtteranceAccumulator<SystemClock> {
    /// Creates an accumulator using the system clock.
    pub fn new(config: AccumulatorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}
