//! Async merger task for tokio-based hosts.
//!
//! Wraps the same accumulator and reconciler the threaded pipeline uses, but
//! speaks tokio mpsc channels and multiplexes the four output streams into a
//! single [`OutputEvent`] sequence so one task can consume everything in
//! arrival order.

use crate::error::Result;
use crate::merge::{AccumulatorConfig, UtteranceAccumulator};
use crate::pipeline::events::{OutputEvent, RecognizerEvent, groups, streams};
use crate::result::{SpeechActivity, VoiceActivity};
use crate::time::{Clock, SystemClock};
use crate::timing::{AdjustPolicy, TimestampReconciler};
use tokio::sync::mpsc;

/// Configuration for the async merger.
#[derive(Debug, Clone, Default)]
pub struct StreamMergerConfig {
    /// Accumulator configuration.
    pub merge: AccumulatorConfig,
    /// Originating-time adjustment policy.
    pub policy: AdjustPolicy,
}

/// Async merger that combines recognizer events into reconciled outputs.
pub struct StreamMerger<C: Clock = SystemClock> {
    accumulator: UtteranceAccumulator<C>,
    reconciler: TimestampReconciler,
    speech_active: bool,
}

impl StreamMerger<SystemClock> {
    /// Creates a merger with the given configuration and the system clock.
    pub fn new(config: StreamMergerConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> StreamMerger<C> {
    /// Creates a merger with an injectable clock.
    pub fn with_clock(config: StreamMergerConfig, clock: C) -> Result<Self> {
        let reconciler = TimestampReconciler::builder()
            .with_policy(config.policy)
            .assign(streams::UTTERANCES, groups::RECOGNITION_RESULTS)?
            .assign(streams::PARTIAL_HYPOTHESES, groups::RECOGNITION_RESULTS)?
            .assign(streams::SPEECH_ACTIVITY, groups::SPEECH_EVENTS)?
            .assign(streams::AUDIO_LEVELS, groups::AUDIO_EVENTS)?
            .build();

        Ok(Self {
            accumulator: UtteranceAccumulator::with_clock(config.merge, clock),
            reconciler,
            speech_active: false,
        })
    }

    /// Handles one recognizer event, returning the output events it produced
    /// in emission order.
    pub fn process(&mut self, event: RecognizerEvent) -> Result<Vec<OutputEvent>> {
        match event {
            RecognizerEvent::Final { result } => {
                self.accumulator.receive_final(result);
                Ok(Vec::new())
            }
            RecognizerEvent::Partial { result } => {
                let combined = self.accumulator.receive_partial(result);
                let time = self
                    .reconciler
                    .adjust(streams::PARTIAL_HYPOTHESES, combined.originating_time)?;
                Ok(vec![OutputEvent::Partial {
                    result: combined,
                    time,
                }])
            }
            RecognizerEvent::Activity { activity } => self.process_activity(activity),
        }
    }

    fn process_activity(&mut self, activity: VoiceActivity) -> Result<Vec<OutputEvent>> {
        let mut events = Vec::new();

        if activity.active != self.speech_active {
            self.speech_active = activity.active;
            let transition = if activity.active {
                SpeechActivity::Started {
                    time: activity.time,
                }
            } else {
                SpeechActivity::Stopped {
                    time: activity.time,
                }
            };
            let time = self
                .reconciler
                .adjust(streams::SPEECH_ACTIVITY, transition.time())?;
            events.push(OutputEvent::Speech {
                activity: transition,
                time,
            });
        }

        if let Some(level) = activity.level {
            let time = self.reconciler.adjust(streams::AUDIO_LEVELS, activity.time)?;
            events.push(OutputEvent::Level { level, time });
        }

        if let Some(merged) = self.accumulator.receive_voice_activity(activity)? {
            let time = self
                .reconciler
                .adjust(streams::UTTERANCES, merged.originating_time)?;
            events.push(OutputEvent::Utterance {
                result: merged,
                time,
            });
        }

        Ok(events)
    }

    /// Runs the merger until the input channel closes.
    ///
    /// Stops quietly when the output side is dropped. Returns an error when
    /// an event violates the merging contract (a pending fragment without a
    /// duration, for instance), leaving everything after it unprocessed.
    ///
    /// # Arguments
    /// * `input` - Receiver for recognizer events
    /// * `output` - Sender for reconciled output events
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<RecognizerEvent>,
        output: mpsc::Sender<OutputEvent>,
    ) -> Result<()> {
        while let Some(event) = input.recv().await {
            for out in self.process(event)? {
                if output.send(out).await.is_err() {
                    // Consumer gone, nothing left to do
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSegment;
    use crate::error::UtterflowError;
    use crate::result::RecognitionResult;
    use crate::time::{MockClock, Timestamp};
    use std::time::Duration;

    fn merger() -> (StreamMerger<MockClock>, MockClock) {
        let clock = MockClock::new(Timestamp::from_millis(0));
        let merger = StreamMerger::with_clock(StreamMergerConfig::default(), clock.clone())
            .expect("stream registration should succeed");
        (merger, clock)
    }

    fn final_event(text: &str, end_ms: i64, duration_ms: u64) -> RecognizerEvent {
        let samples = (duration_ms * 16) as usize;
        RecognizerEvent::Final {
            result: RecognitionResult::new_final(
                text,
                0.9,
                AudioSegment::new(vec![100i16; samples], 16000),
                Some(Duration::from_millis(duration_ms)),
                Timestamp::from_millis(end_ms),
            ),
        }
    }

    fn activity_event(active: bool, at_ms: i64) -> RecognizerEvent {
        RecognizerEvent::Activity {
            activity: VoiceActivity::new(active, Timestamp::from_millis(at_ms)),
        }
    }

    #[test]
    fn test_process_merges_across_boundaries() {
        let (mut merger, clock) = merger();

        // voiced activity flips speech state, producing one transition
        let events = merger.process(activity_event(true, 500)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OutputEvent::Speech { .. }));

        assert!(merger.process(final_event("hello", 1000, 400)).unwrap().is_empty());
        assert!(merger.process(activity_event(true, 1800)).unwrap().is_empty());
        assert!(merger.process(final_event("world", 1800, 500)).unwrap().is_empty());

        clock.set(Timestamp::from_millis(2400));
        let events = merger.process(activity_event(false, 1900)).unwrap();

        // stopped transition plus the merged utterance
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], OutputEvent::Speech { .. }));
        match &events[1] {
            OutputEvent::Utterance { result, time } => {
                assert_eq!(result.text, "hello world");
                assert_eq!(*time, Timestamp::from_millis(1800));
            }
            other => panic!("expected utterance, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_is_stamped_in_the_recognition_group() {
        let (mut merger, _clock) = merger();

        merger.process(final_event("hello", 1000, 400)).unwrap();
        let events = merger
            .process(RecognizerEvent::Partial {
                result: RecognitionResult::new_partial(
                    "wor",
                    0.4,
                    AudioSegment::empty(16000),
                    Timestamp::from_millis(1700),
                ),
            })
            .unwrap();

        match &events[0] {
            OutputEvent::Partial { result, time } => {
                assert_eq!(result.text, "hello wor");
                assert_eq!(*time, Timestamp::from_millis(1700));
            }
            other => panic!("expected partial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_emits_reconciled_outputs() {
        let (merger, clock) = merger();

        let (input_tx, input_rx) = mpsc::channel(16);
        let (output_tx, mut output_rx) = mpsc::channel(16);

        // Run merger in background
        let task = tokio::spawn(async move { merger.run(input_rx, output_tx).await });

        input_tx.send(activity_event(true, 500)).await.unwrap();
        input_tx.send(final_event("hello", 1000, 400)).await.unwrap();
        clock.set(Timestamp::from_millis(1600));
        input_tx.send(activity_event(false, 1100)).await.unwrap();
        drop(input_tx);

        let mut texts = Vec::new();
        while let Some(event) = output_rx.recv().await {
            if let OutputEvent::Utterance { result, .. } = event {
                texts.push(result.text);
            }
        }
        assert_eq!(texts, vec!["hello".to_string()]);

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_quietly_when_consumer_drops() {
        let (merger, _clock) = merger();

        let (input_tx, input_rx) = mpsc::channel(16);
        let (output_tx, output_rx) = mpsc::channel(16);
        drop(output_rx);

        let task = tokio::spawn(async move { merger.run(input_rx, output_tx).await });

        // the first emitting event hits the closed output
        input_tx.send(activity_event(true, 500)).await.unwrap();

        let result = task.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_surfaces_contract_violations() {
        let (merger, clock) = merger();

        let (input_tx, input_rx) = mpsc::channel(16);
        let (output_tx, mut output_rx) = mpsc::channel(16);

        let task = tokio::spawn(async move { merger.run(input_rx, output_tx).await });

        input_tx.send(activity_event(true, 1000)).await.unwrap();
        input_tx
            .send(RecognizerEvent::Final {
                result: RecognitionResult::new_final(
                    "hello",
                    0.9,
                    AudioSegment::empty(16000),
                    None,
                    Timestamp::from_millis(1000),
                ),
            })
            .await
            .unwrap();
        clock.set(Timestamp::from_millis(2000));
        input_tx.send(activity_event(false, 1100)).await.unwrap();

        // drain whatever came out before the failure
        while output_rx.recv().await.is_some() {}

        let error = task.await.unwrap().unwrap_err();
        assert!(matches!(error, UtterflowError::MissingDuration { .. }));
    }
}
