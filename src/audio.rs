//! Audio buffer handling for utterance reconstruction.
//!
//! Recognition fragments carry the PCM segment they were decoded from. When
//! fragments are merged into an utterance, their segments are concatenated
//! with synthesized silence covering the gaps between them, so the merged
//! buffer plays back with the original pacing.

use crate::error::{Result, UtterflowError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A segment of mono 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSegment {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioSegment {
    /// Creates a segment from raw samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Creates an empty segment at the given sample rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Creates a segment of pure silence covering `duration`.
    pub fn silence(duration: Duration, sample_rate: u32) -> Self {
        Self {
            samples: vec![0i16; samples_for(duration, sample_rate)],
            sample_rate,
        }
    }

    /// Number of samples in the segment.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when the segment holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration of the segment.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let nanos = self.samples.len() as u64 * 1_000_000_000 / self.sample_rate as u64;
        Duration::from_nanos(nanos)
    }

    /// Appends another segment's samples to this one.
    ///
    /// Appending an empty segment is a no-op. Otherwise the sample rates must
    /// agree; resampling is out of scope here.
    pub fn append(&mut self, other: &AudioSegment) -> Result<()> {
        if other.samples.is_empty() {
            return Ok(());
        }
        if other.sample_rate != self.sample_rate {
            return Err(UtterflowError::SampleRateMismatch {
                expected: self.sample_rate,
                actual: other.sample_rate,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Appends synthesized silence covering `duration`.
    pub fn append_silence(&mut self, duration: Duration) {
        let count = samples_for(duration, self.sample_rate);
        self.samples.resize(self.samples.len() + count, 0);
    }
}

/// Number of samples needed to cover `duration` at `sample_rate`.
fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    let count = duration.as_nanos() * sample_rate as u128 / 1_000_000_000;
    usize::try_from(count).unwrap_or(usize::MAX)
}
