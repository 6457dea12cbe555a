use super::as_text;
use crate::diff::Change;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};

/// Changes to the public one-line description.
pub struct PositioningRule;

impl SignalRule for PositioningRule {
    fn key(&self) -> &str {
        "headline"
    }

    fn signal_type(&self) -> &str {
        "positioning_change"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Product
    }

    fn severity(&self, _change: &Change) -> SignalSeverity {
        SignalSeverity::Low
    }

    fn message(&self, competitor: &Company, change: &Change) -> String {
        match as_text(&change.new) {
            Some(headline) => format!("{} updated its positioning: \"{headline}\"", competitor.name),
            None => format!("{} removed its public description", competitor.name),
        }
    }
}
