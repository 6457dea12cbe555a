use crate::diff::Change;
use crate::rules::funding::{FundingRoundRule, FundingRule};
use crate::rules::headcount::HeadcountRule;
use crate::rules::headline::PositioningRule;
use crate::rules::industries::IndustryShiftRule;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalDraft};
use std::sync::OnceLock;

/// Holds one [`SignalRule`] per snapshot key.
pub struct SignalEngine {
    rules: Vec<Box<dyn SignalRule>>,
}

impl Default for SignalEngine {
    /// The built-in rule set covering every meaningful key.
    fn default() -> Self {
        let rules: Vec<Box<dyn SignalRule>> = vec![
            Box::new(HeadcountRule::default()),
            Box::new(IndustryShiftRule),
            Box::new(FundingRule),
            Box::new(FundingRoundRule),
            Box::new(PositioningRule),
        ];
        Self::new(rules)
    }
}

impl SignalEngine {
    pub fn new(rules: Vec<Box<dyn SignalRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn SignalRule>] {
        &self.rules
    }

    pub fn rule_for(&self, key: &str) -> Option<&dyn SignalRule> {
        self.rules.iter().find(|r| r.key() == key).map(|r| r.as_ref())
    }

    /// Produces exactly one draft per change that has a registered rule.
    pub fn derive(&self, company: &Company, competitor: &Company, changes: &[Change]) -> Vec<SignalDraft> {
        changes
            .iter()
            .filter_map(|change| {
                let Some(rule) = self.rule_for(&change.key) else {
                    tracing::warn!(key = %change.key, "No signal rule for changed key");
                    return None;
                };
                Some(SignalDraft {
                    company_id: company.id.clone(),
                    competitor_id: competitor.id.clone(),
                    signal_type: rule.signal_type().to_string(),
                    category: rule.category(),
                    severity: rule.severity(change),
                    message: rule.message(competitor, change),
                    details: Some(change.details()),
                })
            })
            .collect()
    }
}

/// Derives signals with the built-in rule set.
pub fn derive_signals(company: &Company, competitor: &Company, changes: &[Change]) -> Vec<SignalDraft> {
    static ENGINE: OnceLock<SignalEngine> = OnceLock::new();
    ENGINE
        .get_or_init(SignalEngine::default)
        .derive(company, competitor, changes)
}
