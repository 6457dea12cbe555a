//! Snapshot diffing and signal derivation for tracked competitors.
//!
//! A [`snapshot::Observation`] of a competitor is serialised into a fixed
//! JSON document. Two consecutive documents are compared with
//! [`diff::diff`], which only looks at [`diff::MEANINGFUL_KEYS`]. Every
//! resulting [`diff::Change`] is turned into one signal by the
//! [`SignalRule`] registered for its key in the [`engine::SignalEngine`].

pub mod diff;
pub mod engine;
pub mod rules;
pub mod snapshot;

#[cfg(test)]
mod tests;

use diff::Change;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};

pub use diff::{diff, MEANINGFUL_KEYS};
pub use engine::{derive_signals, SignalEngine};
pub use snapshot::Observation;

/// Maps a change of one snapshot key to a user-facing signal.
pub trait SignalRule: Send + Sync {
    /// The snapshot key this rule handles (e.g. `"employees"`).
    fn key(&self) -> &str;

    /// Stable machine-readable type stored with the signal
    /// (e.g. `"headcount_change"`).
    fn signal_type(&self) -> &str;

    fn category(&self) -> SignalCategory;

    /// Severity of the change; may depend on its magnitude.
    fn severity(&self, change: &Change) -> SignalSeverity;

    /// Human-readable message naming the competitor.
    fn message(&self, competitor: &Company, change: &Change) -> String;
}
