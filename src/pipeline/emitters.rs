//! Typed output channels fronted by the timestamp reconciler.
//!
//! Every value leaving the pipeline passes through the [`EmitterBank`]'s
//! reconciler before it is sent, so consumers on the [`Outputs`] side can
//! rely on monotonic times within each reconciliation group without
//! coordinating with each other.

use crate::error::{Result, UtterflowError};
use crate::pipeline::events::{Stamped, groups, streams};
use crate::result::{RecognitionResult, SpeechActivity};
use crate::time::Timestamp;
use crate::timing::{AdjustPolicy, TimestampReconciler};
use crossbeam_channel::{Receiver, Sender, bounded};

/// Receiving ends of the pipeline's output streams.
///
/// Each field is an independent bounded channel. Dropping the utterance or
/// partial receiver shuts the pipeline down on its next post; the speech and
/// level receivers may be dropped freely.
pub struct Outputs {
    /// Merged utterances, one per silence boundary.
    pub utterances: Receiver<Stamped<RecognitionResult>>,
    /// Live partial hypotheses.
    pub partial_hypotheses: Receiver<Stamped<RecognitionResult>>,
    /// Speech started/stopped transitions.
    pub speech_activity: Receiver<Stamped<SpeechActivity>>,
    /// Audio level samples.
    pub audio_levels: Receiver<Stamped<f32>>,
}

/// Sending side of the pipeline's output streams.
///
/// Owns the reconciler; every post adjusts its proposed time against the
/// stream's group watermark first, then sends the stamped value.
pub struct EmitterBank {
    reconciler: TimestampReconciler,
    utterances: Sender<Stamped<RecognitionResult>>,
    partial_hypotheses: Sender<Stamped<RecognitionResult>>,
    speech_activity: Sender<Stamped<SpeechActivity>>,
    audio_levels: Sender<Stamped<f32>>,
}

impl EmitterBank {
    /// Creates the bank and its matching receivers.
    ///
    /// Registers the four output streams with the reconciler: utterances and
    /// partial hypotheses share the recognition-results group, speech and
    /// audio events each get their own.
    pub fn new(policy: AdjustPolicy, capacity: usize) -> Result<(Self, Outputs)> {
        let reconciler = TimestampReconciler::builder()
            .with_policy(policy)
            .assign(streams::UTTERANCES, groups::RECOGNITION_RESULTS)?
            .assign(streams::PARTIAL_HYPOTHESES, groups::RECOGNITION_RESULTS)?
            .assign(streams::SPEECH_ACTIVITY, groups::SPEECH_EVENTS)?
            .assign(streams::AUDIO_LEVELS, groups::AUDIO_EVENTS)?
            .build();

        let (utterance_tx, utterance_rx) = bounded(capacity);
        let (partial_tx, partial_rx) = bounded(capacity);
        let (speech_tx, speech_rx) = bounded(capacity);
        let (level_tx, level_rx) = bounded(capacity);

        let bank = Self {
            reconciler,
            utterances: utterance_tx,
            partial_hypotheses: partial_tx,
            speech_activity: speech_tx,
            audio_levels: level_tx,
        };
        let outputs = Outputs {
            utterances: utterance_rx,
            partial_hypotheses: partial_rx,
            speech_activity: speech_rx,
            audio_levels: level_rx,
        };
        Ok((bank, outputs))
    }

    /// Posts a merged utterance, blocking while the channel is full.
    ///
    /// Returns the reconciled time it was stamped with.
    pub fn post_utterance(&mut self, result: RecognitionResult) -> Result<Timestamp> {
        let time = self
            .reconciler
            .adjust(streams::UTTERANCES, result.originating_time)?;
        self.utterances
            .send(Stamped::new(result, time))
            .map_err(|_| UtterflowError::OutputClosed {
                stream: streams::UTTERANCES.to_string(),
            })?;
        Ok(time)
    }

    /// Posts a partial hypothesis, blocking while the channel is full.
    ///
    /// Shares a group with utterances, so a partial arriving with the same
    /// estimated time as the preceding utterance is nudged past it.
    pub fn post_partial(&mut self, result: RecognitionResult) -> Result<Timestamp> {
        let time = self
            .reconciler
            .adjust(streams::PARTIAL_HYPOTHESES, result.originating_time)?;
        self.partial_hypotheses
            .send(Stamped::new(result, time))
            .map_err(|_| UtterflowError::OutputClosed {
                stream: streams::PARTIAL_HYPOTHESES.to_string(),
            })?;
        Ok(time)
    }

    /// Posts a speech boundary transition without blocking.
    ///
    /// Speech events are advisory; if the consumer lags or has gone away the
    /// event is dropped rather than stalling recognition output.
    pub fn post_speech(&mut self, activity: SpeechActivity) -> Result<Timestamp> {
        let time = self
            .reconciler
            .adjust(streams::SPEECH_ACTIVITY, activity.time())?;
        if self
            .speech_activity
            .try_send(Stamped::new(activity, time))
            .is_err()
        {
            // Channel full or closed - OK to drop advisory events
        }
        Ok(time)
    }

    /// Posts an audio level sample without blocking.
    ///
    /// Levels arrive at voice-activity cadence and are advisory; drops are
    /// acceptable under consumer lag.
    pub fn post_level(&mut self, level: f32, time: Timestamp) -> Result<Timestamp> {
        let time = self.reconciler.adjust(streams::AUDIO_LEVELS, time)?;
        if self.audio_levels.try_send(Stamped::new(level, time)).is_err() {
            // Channel full or closed - OK to drop advisory events
        }
        Ok(time)
    }
}
