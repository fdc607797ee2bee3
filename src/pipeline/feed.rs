//! Ingress handle for pushing recognizer events into a running pipeline.

use crate::error::{Result, UtterflowError};
use crate::pipeline::events::RecognizerEvent;
use crate::result::{RecognitionResult, VoiceActivity};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle feeding events into the merger station.
///
/// Clones share one bounded channel, so events from different upstream
/// threads are serialized into a single ordered stream before the merger
/// sees them. Sends block while the channel is full, applying backpressure
/// to the caller instead of dropping recognition results.
///
/// Dropping every clone closes the channel and lets the merger drain and
/// exit; [`Pipeline::stop`] relies on that for a clean join.
///
/// [`Pipeline::stop`]: crate::pipeline::orchestrator::PipelineHandle::stop
#[derive(Clone)]
pub struct RecognizerFeed {
    event_tx: Sender<RecognizerEvent>,
    running: Arc<AtomicBool>,
}

impl RecognizerFeed {
    pub(crate) fn new(event_tx: Sender<RecognizerEvent>, running: Arc<AtomicBool>) -> Self {
        Self { event_tx, running }
    }

    /// Pushes a committed recognition result.
    pub fn final_result(&self, result: RecognitionResult) -> Result<()> {
        self.push(RecognizerEvent::Final { result })
    }

    /// Pushes an in-flight hypothesis.
    pub fn partial_result(&self, result: RecognitionResult) -> Result<()> {
        self.push(RecognizerEvent::Partial { result })
    }

    /// Pushes a voice activity observation.
    pub fn voice_activity(&self, activity: VoiceActivity) -> Result<()> {
        self.push(RecognizerEvent::Activity { activity })
    }

    /// Pushes an already-wrapped event.
    pub fn event(&self, event: RecognizerEvent) -> Result<()> {
        self.push(event)
    }

    /// Returns true while the pipeline is accepting events.
    pub fn is_open(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn push(&self, event: RecognizerEvent) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(UtterflowError::PipelineClosed);
        }
        self.event_tx
            .send(event)
            .map_err(|_| UtterflowError::PipelineClosed)
    }
}
