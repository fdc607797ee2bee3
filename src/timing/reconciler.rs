//! Causal timestamp reconciler.
//!
//! Upstream originating times are estimates: final results carry engine
//! audio-position offsets while partial hypotheses and level updates use the
//! engine's current position, and the two formulas can disagree locally.
//! Stream stores require strictly increasing times per stream, so every post
//! goes through the reconciler, which tracks the last posted time per causal
//! group of streams and adjusts any proposal that does not move forward.

use crate::error::{Result, UtterflowError};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a proposed time that does not exceed the group watermark is adjusted.
///
/// The two variants produce different tie-breaking for simultaneous events:
/// bumping keeps every event distinct in time, clamping collapses them onto
/// the watermark. Pick per reconciler; there is no universally right answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustPolicy {
    /// Adjust to one tick past the group's last posted time, keeping the
    /// sequence strictly increasing.
    #[default]
    BumpTick,
    /// Adjust to exactly the group's last posted time, keeping the sequence
    /// non-decreasing.
    ClampToLast,
}

/// Builder for [`TimestampReconciler`] stream registration.
///
/// Group membership is fixed at construction; posting to a stream that was
/// never assigned is a programming error surfaced at the call site.
#[derive(Debug, Default)]
pub struct ReconcilerBuilder {
    policy: AdjustPolicy,
    stream_groups: HashMap<String, String>,
}

impl ReconcilerBuilder {
    /// Selects the adjustment policy.
    pub fn with_policy(mut self, policy: AdjustPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assigns a stream to a causal group.
    pub fn assign(mut self, stream: impl Into<String>, group: impl Into<String>) -> Result<Self> {
        let stream = stream.into();
        if self.stream_groups.contains_key(&stream) {
            return Err(UtterflowError::DuplicateStream { stream });
        }
        self.stream_groups.insert(stream, group.into());
        Ok(self)
    }

    /// Finishes registration.
    pub fn build(self) -> TimestampReconciler {
        TimestampReconciler {
            policy: self.policy,
            stream_groups: self.stream_groups,
            last_posted: HashMap::new(),
        }
    }
}

/// Per-group monotonic timestamp adjustment.
///
/// Single-threaded by contract, like the accumulator: all adjustments for a
/// reconciler happen on the owning pipeline's delivery thread.
#[derive(Debug)]
pub struct TimestampReconciler {
    policy: AdjustPolicy,
    stream_groups: HashMap<String, String>,
    last_posted: HashMap<String, Timestamp>,
}

impl TimestampReconciler {
    /// Starts stream registration.
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::default()
    }

    /// Adjusts `proposed` so the stream's group stays monotonic, and records
    /// the adjusted time as the group's new watermark.
    ///
    /// A proposal later than the watermark passes through unchanged. One at
    /// or before the watermark is bumped one tick past it or clamped onto
    /// it, per policy.
    pub fn adjust(&mut self, stream: &str, proposed: Timestamp) -> Result<Timestamp> {
        let group = self.stream_groups.get(stream).ok_or_else(|| {
            UtterflowError::UnregisteredStream {
                stream: stream.to_string(),
            }
        })?;

        let last = self
            .last_posted
            .get(group.as_str())
            .copied()
            .unwrap_or(Timestamp::MIN);
        let adjusted = if proposed <= last {
            match self.policy {
                AdjustPolicy::BumpTick => last.next_tick(),
                AdjustPolicy::ClampToLast => last,
            }
        } else {
            proposed
        };

        self.last_posted.insert(group.clone(), adjusted);
        Ok(adjusted)
    }

    /// The configured adjustment policy.
    pub fn policy(&self) -> AdjustPolicy {
        self.policy
    }

    /// The group a stream was assigned to, if any.
    pub fn group_of(&self, stream: &str) -> Option<&str> {
        self.stream_groups.get(stream).map(String::as_str)
    }

    /// The group's watermark: the last adjusted time posted to any of its
    /// streams.
    pub fn last_posted(&self, group: &str) -> Option<Timestamp> {
        self.last_posted.get(group).copied()
    }
}
