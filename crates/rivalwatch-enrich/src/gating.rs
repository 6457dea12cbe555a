use rivalwatch_common::types::Company;
use std::fmt;

/// Why a paid enrichment call is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichReason {
    NewCompany,
    MissingDomain,
    NeverEnriched,
    DomainChanged,
}

impl fmt::Display for EnrichReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NewCompany => "new company",
            Self::MissingDomain => "no stored domain",
            Self::NeverEnriched => "never enriched",
            Self::DomainChanged => "domain changed",
        })
    }
}

/// Decides whether the enrichment endpoint may be called for `company`.
///
/// The call is allowed when the company was just created, has no domain,
/// has never been enriched (`enriched_at` unset), or `candidate_domain`
/// differs from the stored domain. Domains are compared exactly; callers
/// pass values already run through [`crate::domain::clean_domain`].
pub fn enrichment_reason(
    company: &Company,
    is_new: bool,
    candidate_domain: Option<&str>,
) -> Option<EnrichReason> {
    if is_new {
        return Some(EnrichReason::NewCompany);
    }
    let Some(stored) = company.domain.as_deref().filter(|d| !d.is_empty()) else {
        return Some(EnrichReason::MissingDomain);
    };
    if company.enriched_at.is_none() {
        return Some(EnrichReason::NeverEnriched);
    }
    match candidate_domain {
        Some(candidate) if !candidate.is_empty() && candidate != stored => {
            Some(EnrichReason::DomainChanged)
        }
        _ => None,
    }
}

pub fn needs_enrichment(company: &Company, is_new: bool, candidate_domain: Option<&str>) -> bool {
    enrichment_reason(company, is_new, candidate_domain).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn enriched(domain: &str) -> Company {
        let mut c = Company::new("1".into(), "Acme");
        c.domain = Some(domain.into());
        c.enriched_at = Some(Utc::now());
        c
    }

    #[test]
    fn skips_when_domain_matches_and_already_enriched() {
        let acme = enriched("acme.com");
        assert!(!needs_enrichment(&acme, false, Some("acme.com")));
        assert!(!needs_enrichment(&acme, false, None));
    }

    #[test]
    fn new_company_always_fetches() {
        let acme = enriched("acme.com");
        assert_eq!(
            enrichment_reason(&acme, true, Some("acme.com")),
            Some(EnrichReason::NewCompany)
        );
    }

    #[test]
    fn missing_domain_or_timestamp_fetches() {
        let mut acme = enriched("acme.com");
        acme.enriched_at = None;
        assert_eq!(
            enrichment_reason(&acme, false, Some("acme.com")),
            Some(EnrichReason::NeverEnriched)
        );

        acme.domain = None;
        assert_eq!(
            enrichment_reason(&acme, false, Some("acme.com")),
            Some(EnrichReason::MissingDomain)
        );
    }

    #[test]
    fn different_domain_fetches() {
        let acme = enriched("acme.com");
        assert_eq!(
            enrichment_reason(&acme, false, Some("acme.io")),
            Some(EnrichReason::DomainChanged)
        );
    }
}
