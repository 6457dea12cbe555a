use crate::diff::Change;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};

/// Employee-count changes.
///
/// Severity follows the relative change against the previous count:
/// below `medium_pct` is low, below `high_pct` is medium, anything larger
/// is high. A count appearing or disappearing is medium.
pub struct HeadcountRule {
    pub medium_pct: f64,
    pub high_pct: f64,
}

impl Default for HeadcountRule {
    fn default() -> Self {
        Self {
            medium_pct: 10.0,
            high_pct: 25.0,
        }
    }
}

impl HeadcountRule {
    fn counts(change: &Change) -> (Option<i64>, Option<i64>) {
        (change.old.as_i64(), change.new.as_i64())
    }
}

impl SignalRule for HeadcountRule {
    fn key(&self) -> &str {
        "employees"
    }

    fn signal_type(&self) -> &str {
        "headcount_change"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Hiring
    }

    fn severity(&self, change: &Change) -> SignalSeverity {
        match Self::counts(change) {
            (Some(0), Some(_)) => SignalSeverity::High,
            (Some(old), Some(new)) => {
                let pct = ((new as f64 - old as f64) / old as f64).abs() * 100.0;
                if pct < self.medium_pct {
                    SignalSeverity::Low
                } else if pct < self.high_pct {
                    SignalSeverity::Medium
                } else {
                    SignalSeverity::High
                }
            }
            _ => SignalSeverity::Medium,
        }
    }

    fn message(&self, competitor: &Company, change: &Change) -> String {
        let name = &competitor.name;
        match Self::counts(change) {
            (Some(old), Some(new)) if old > 0 => {
                let pct = (new as f64 - old as f64) / old as f64 * 100.0;
                let verb = if new > old { "grew" } else { "shrank" };
                format!("{name} headcount {verb} from {old} to {new} ({pct:+.0}%)")
            }
            (Some(old), Some(new)) => format!("{name} headcount changed from {old} to {new}"),
            (None, Some(new)) => format!("{name} now reports {new} employees"),
            (Some(old), None) => format!("{name} no longer reports a headcount (was {old})"),
            (None, None) => format!("{name} headcount changed"),
        }
    }
}
