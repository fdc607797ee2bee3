//! Originating-time consistency for causally related output streams.

pub mod reconciler;

pub use reconciler::{AdjustPolicy, ReconcilerBuilder, TimestampReconciler};
