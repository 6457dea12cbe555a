use super::as_text;
use crate::diff::Change;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};

/// Formats a currency amount compactly, e.g. `12500000` as `$12.5M`.
pub fn format_amount(amount: i64) -> String {
    let value = amount as f64;
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("${:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.0}K", value / 1_000.0)
    } else {
        format!("${amount}")
    }
}

/// Total-funding changes. Any movement is high severity.
pub struct FundingRule;

impl SignalRule for FundingRule {
    fn key(&self) -> &str {
        "funding"
    }

    fn signal_type(&self) -> &str {
        "funding_change"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Funding
    }

    fn severity(&self, _change: &Change) -> SignalSeverity {
        SignalSeverity::High
    }

    fn message(&self, competitor: &Company, change: &Change) -> String {
        let name = &competitor.name;
        match (change.old.as_i64(), change.new.as_i64()) {
            (Some(old), Some(new)) => format!(
                "{name} total funding changed from {} to {}",
                format_amount(old),
                format_amount(new)
            ),
            (None, Some(new)) => format!("{name} reported funding of {}", format_amount(new)),
            _ => format!("{name} funding information changed"),
        }
    }
}

/// Funding-stage changes (e.g. Series A to Series B).
pub struct FundingRoundRule;

impl SignalRule for FundingRoundRule {
    fn key(&self) -> &str {
        "funding_stage"
    }

    fn signal_type(&self) -> &str {
        "funding_round"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Funding
    }

    fn severity(&self, _change: &Change) -> SignalSeverity {
        SignalSeverity::High
    }

    fn message(&self, competitor: &Company, change: &Change) -> String {
        match (as_text(&change.old), as_text(&change.new)) {
            (Some(old), Some(new)) => format!("{} moved from {old} to {new}", competitor.name),
            (None, Some(new)) => format!("{} is now at funding stage {new}", competitor.name),
            _ => format!("{} funding stage changed", competitor.name),
        }
    }
}
