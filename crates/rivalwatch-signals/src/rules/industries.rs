use crate::diff::Change;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};
use serde_json::Value;
use std::collections::BTreeSet;

pub struct IndustryShiftRule;

fn labels(value: &Value) -> BTreeSet<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl SignalRule for IndustryShiftRule {
    fn key(&self) -> &str {
        "industries"
    }

    fn signal_type(&self) -> &str {
        "industry_shift"
    }

    fn category(&self) -> SignalCategory {
        SignalCategory::Product
    }

    fn severity(&self, _change: &Change) -> SignalSeverity {
        SignalSeverity::Medium
    }

    fn message(&self, competitor: &Company, change: &Change) -> String {
        let old = labels(&change.old);
        let new = labels(&change.new);
        let added: Vec<&str> = new.difference(&old).map(String::as_str).collect();
        let removed: Vec<&str> = old.difference(&new).map(String::as_str).collect();

        let mut parts = Vec::new();
        if !added.is_empty() {
            parts.push(format!("entered {}", added.join(", ")));
        }
        if !removed.is_empty() {
            parts.push(format!("left {}", removed.join(", ")));
        }
        if parts.is_empty() {
            format!("{} changed its industry focus", competitor.name)
        } else {
            format!("{} {}", competitor.name, parts.join(" and "))
        }
    }
}
