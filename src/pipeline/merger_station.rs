//! Merger station that turns recognizer events into reconciled outputs.

use crate::merge::{AccumulatorConfig, UtteranceAccumulator};
use crate::pipeline::emitters::EmitterBank;
use crate::pipeline::error::StationError;
use crate::pipeline::events::RecognizerEvent;
use crate::pipeline::station::Station;
use crate::result::{SpeechActivity, VoiceActivity};
use crate::time::{Clock, SystemClock};
use std::sync::Arc;

/// Terminal station wrapping the utterance accumulator.
///
/// Consumes the multiplexed recognizer event stream and emits everything
/// through the out-of-band [`EmitterBank`] channels, so its station output
/// type is `()`. Running it on a [`StationRunner`] thread gives the
/// accumulator the serialized delivery its contract requires.
///
/// [`StationRunner`]: crate::pipeline::station::StationRunner
pub struct MergerStation {
    accumulator: UtteranceAccumulator<Arc<dyn Clock>>,
    emitters: EmitterBank,
    speech_active: bool,
}

impl MergerStation {
    /// Creates a merger station with the given configuration.
    pub fn new(config: AccumulatorConfig, emitters: EmitterBank) -> Self {
        Self::with_clock(config, emitters, Arc::new(SystemClock))
    }

    /// Creates a merger station with an injectable clock.
    pub fn with_clock(
        config: AccumulatorConfig,
        emitters: EmitterBank,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accumulator: UtteranceAccumulator::with_clock(config, clock),
            emitters,
            speech_active: false,
        }
    }

    fn handle_activity(&mut self, activity: VoiceActivity) -> Result<(), StationError> {
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
            self.emitters.post_speech(transition)?;
        }

        if let Some(level) = activity.level {
            self.emitters.post_level(level, activity.time)?;
        }

        if let Some(merged) = self.accumulator.receive_voice_activity(activity)? {
            self.emitters.post_utterance(merged)?;
        }
        Ok(())
    }
}

impl Station for MergerStation {
    type Input = RecognizerEvent;
    type Output = ();

    fn name(&self) -> &'static str {
        "merger"
    }

    fn process(&mut self, event: RecognizerEvent) -> Result<Option<()>, StationError> {
        match event {
            RecognizerEvent::Final { result } => {
                self.accumulator.receive_final(result);
            }
            RecognizerEvent::Partial { result } => {
                let combined = self.accumulator.receive_partial(result);
                self.emitters.post_partial(combined)?;
            }
            RecognizerEvent::Activity { activity } => {
                self.handle_activity(activity)?;
            }
        }
        Ok(None)
    }
}
