use chrono::{DateTime, Utc};
use rivalwatch_common::types::Company;

use crate::models::CompanyProfile;

/// What [`apply_profile`] changed on a company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Names of fields that were empty and got filled.
    pub filled: Vec<&'static str>,
    /// Industry labels to union into the company's industry set.
    pub industries: Vec<String>,
    /// Whether `domain` and `enriched_at` were stamped.
    pub stamped: bool,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn fill_text(
    slot: &mut Option<String>,
    incoming: &Option<String>,
    field: &'static str,
    filled: &mut Vec<&'static str>,
) {
    if is_blank(slot) {
        if let Some(value) = incoming.as_ref().filter(|v| !v.trim().is_empty()) {
            *slot = Some(value.clone());
            filled.push(field);
        }
    }
}

fn fill_number(
    slot: &mut Option<i64>,
    incoming: Option<i64>,
    field: &'static str,
    filled: &mut Vec<&'static str>,
) {
    if slot.is_none() {
        if let Some(value) = incoming {
            *slot = Some(value);
            filled.push(field);
        }
    }
}

/// Merges a successful provider response into a company record.
///
/// Non-empty fields are never overwritten. `domain` and `enriched_at` are
/// always replaced with the provider's values. An empty profile (the
/// failure fallback) leaves the record untouched, so `enriched_at` stays
/// unset and the next signup retries.
pub fn apply_profile(company: &mut Company, profile: &CompanyProfile, now: DateTime<Utc>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    if profile.is_empty() {
        return outcome;
    }

    if let Some(domain) = profile.domain.as_ref() {
        company.domain = Some(domain.clone());
    }
    company.enriched_at = Some(profile.fetched_at.unwrap_or(now));
    outcome.stamped = true;

    let filled = &mut outcome.filled;
    fill_text(&mut company.website, &profile.website, "website", filled);
    fill_text(&mut company.headline, &profile.headline, "headline", filled);
    fill_number(&mut company.number_of_employees, profile.employees, "number_of_employees", filled);
    fill_number(&mut company.funding, profile.funding, "funding", filled);
    fill_text(&mut company.funding_stage, &profile.funding_stage, "funding_stage", filled);
    fill_text(&mut company.country, &profile.country, "country", filled);
    fill_text(&mut company.city, &profile.city, "city", filled);
    fill_text(&mut company.industry, &profile.industry, "industry", filled);
    fill_text(&mut company.linkedin_url, &profile.linkedin_url, "linkedin_url", filled);

    outcome.industries = profile.industries.clone();
    outcome
}

/// Fills only empty fields, without stamping `domain` or `enriched_at`.
///
/// Used when an existing record is reused as a competitor.
pub fn fill_missing(company: &mut Company, profile: &CompanyProfile) -> Vec<&'static str> {
    let mut filled = Vec::new();
    fill_text(&mut company.domain, &profile.domain, "domain", &mut filled);
    fill_text(&mut company.website, &profile.website, "website", &mut filled);
    fill_text(&mut company.headline, &profile.headline, "headline", &mut filled);
    fill_number(&mut company.number_of_employees, profile.employees, "number_of_employees", &mut filled);
    fill_number(&mut company.funding, profile.funding, "funding", &mut filled);
    fill_text(&mut company.funding_stage, &profile.funding_stage, "funding_stage", &mut filled);
    fill_text(&mut company.country, &profile.country, "country", &mut filled);
    fill_text(&mut company.city, &profile.city, "city", &mut filled);
    fill_text(&mut company.industry, &profile.industry, "industry", &mut filled);
    fill_text(&mut company.linkedin_url, &profile.linkedin_url, "linkedin_url", &mut filled);
    filled
}

/// The company as currently observed: fresh provider values win over the
/// stored ones, stored values fill the gaps. The stored record itself is
/// not modified.
pub fn overlay_profile(company: &Company, profile: &CompanyProfile) -> Company {
    let mut observed = company.clone();
    let pick_text = |fresh: &Option<String>, stored: &Option<String>| {
        fresh
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| stored.clone())
    };
    observed.domain = pick_text(&profile.domain, &company.domain);
    observed.headline = pick_text(&profile.headline, &company.headline);
    observed.funding_stage = pick_text(&profile.funding_stage, &company.funding_stage);
    observed.country = pick_text(&profile.country, &company.country);
    observed.industry = pick_text(&profile.industry, &company.industry);
    observed.number_of_employees = profile.employees.or(company.number_of_employees);
    observed.funding = profile.funding.or(company.funding);
    if !profile.industries.is_empty() {
        observed.industries = profile.industries.clone();
    }
    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> CompanyProfile {
        CompanyProfile {
            name: Some("Acme".into()),
            domain: Some("acme.com".into()),
            website: Some("https://acme.com".into()),
            headline: Some("Widgets at scale".into()),
            employees: Some(250),
            funding: Some(10_000_000),
            funding_stage: Some("Series A".into()),
            country: Some("Netherlands".into()),
            city: None,
            industry: Some("SaaS".into()),
            industries: vec!["SaaS".into(), "Retail".into()],
            linkedin_url: None,
            fetched_at: None,
        }
    }

    #[test]
    fn fills_empty_fields_and_keeps_existing_ones() {
        let mut acme = Company::new("1".into(), "Acme");
        acme.domain = Some("old-acme.com".into());
        acme.headline = Some("Hand-written headline".into());
        acme.number_of_employees = Some(12);
        acme.country = Some(" ".into());

        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let outcome = apply_profile(&mut acme, &profile(), now);

        assert_eq!(acme.headline.as_deref(), Some("Hand-written headline"));
        assert_eq!(acme.number_of_employees, Some(12));
        assert_eq!(acme.website.as_deref(), Some("https://acme.com"));
        assert_eq!(acme.funding, Some(10_000_000));
        assert_eq!(acme.country.as_deref(), Some("Netherlands"));
        assert_eq!(acme.domain.as_deref(), Some("acme.com"));
        assert_eq!(acme.enriched_at, Some(now));
        assert!(outcome.stamped);
        assert!(outcome.filled.contains(&"country"));
        assert!(!outcome.filled.contains(&"headline"));
        assert_eq!(outcome.industries, vec!["SaaS", "Retail"]);
    }

    #[test]
    fn provider_timestamp_wins_over_now() {
        let mut acme = Company::new("1".into(), "Acme");
        let fetched = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let p = CompanyProfile {
            fetched_at: Some(fetched),
            ..profile()
        };
        apply_profile(&mut acme, &p, Utc::now());
        assert_eq!(acme.enriched_at, Some(fetched));
    }

    #[test]
    fn empty_profile_changes_nothing() {
        let mut acme = Company::new("1".into(), "Acme");
        acme.domain = Some("acme.com".into());
        let before = acme.clone();
        let outcome = apply_profile(&mut acme, &CompanyProfile::default(), Utc::now());
        assert_eq!(acme, before);
        assert!(!outcome.stamped);
        assert!(acme.enriched_at.is_none());
    }

    #[test]
    fn fill_missing_never_stamps() {
        let mut zeta = Company::new("2".into(), "Zeta");
        zeta.domain = Some("zeta.io".into());
        let filled = fill_missing(&mut zeta, &profile());
        assert_eq!(zeta.domain.as_deref(), Some("zeta.io"));
        assert!(zeta.enriched_at.is_none());
        assert!(filled.contains(&"headline"));
        assert!(!filled.contains(&"domain"));
    }

    #[test]
    fn overlay_prefers_fresh_values() {
        let mut zeta = Company::new("2".into(), "Zeta");
        zeta.number_of_employees = Some(100);
        zeta.city = Some("Delft".into());
        zeta.industries = vec!["Retail".into()];

        let observed = overlay_profile(&zeta, &profile());
        assert_eq!(observed.number_of_employees, Some(250));
        assert_eq!(observed.city.as_deref(), Some("Delft"));
        assert_eq!(observed.industries, vec!["SaaS", "Retail"]);
        assert_eq!(zeta.number_of_employees, Some(100));

        let unchanged = overlay_profile(&zeta, &CompanyProfile::default());
        assert_eq!(unchanged.number_of_employees, Some(100));
    }
}
