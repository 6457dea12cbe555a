use anyhow::Result;
use chrono::Utc;
use rivalwatch_common::types::Company;
use rivalwatch_enrich::domain::clean_domain;
use rivalwatch_enrich::filter::filter_competitors;
use rivalwatch_enrich::{
    apply_profile, enrichment_reason, fetch_profile, fetch_similar, fill_missing, CompanyProfile,
    ENRICH_CREDITS, SIMILAR_CREDITS_PER_COMPANY,
};
use rivalwatch_storage::store::UsageEndpoint;
use rivalwatch_storage::{IntelStore, StorageError};

use crate::services::snapshots;
use crate::state::AppState;

/// What onboarding a company at signup did.
#[derive(Debug, Clone)]
pub struct OnboardingReport {
    pub company: Company,
    pub is_new: bool,
    /// Whether the provider answered and the record was stamped.
    pub enriched: bool,
    pub competitors_added: usize,
    pub credits: i64,
}

/// Finds the company named `name` (case-insensitively) or creates it, then
/// runs the credit-aware enrichment policy for `submitted_domain`.
///
/// Competitor discovery runs only for a brand-new company whose first
/// enrichment succeeded; it never runs again for that company.
pub async fn onboard_company(
    state: &AppState,
    name: &str,
    submitted_domain: &str,
) -> Result<OnboardingReport> {
    let store = state.store.as_ref();
    let domain = clean_domain(submitted_domain);
    let candidate = Some(domain.as_str()).filter(|d| !d.is_empty());

    let (mut company, is_new) = match store.find_company_by_name(name).await? {
        Some(company) => (company, false),
        None => (store.create_company(name, candidate).await?, true),
    };

    let mut report = OnboardingReport {
        company: company.clone(),
        is_new,
        enriched: false,
        competitors_added: 0,
        credits: 0,
    };

    let Some(reason) = enrichment_reason(&company, is_new, candidate) else {
        tracing::info!(
            company = %company.name,
            domain = %domain,
            "Company already enriched for this domain, skipping paid lookup"
        );
        return Ok(report);
    };

    // Manual data first: a missing domain is taken from the form.
    if company.domain.as_deref().map_or(true, |d| d.trim().is_empty()) && candidate.is_some() {
        company.domain = candidate.map(str::to_owned);
        company = store.update_company(&company).await?;
    }

    let (Some(provider), Some(lookup_domain)) = (state.enricher(), candidate) else {
        tracing::info!(
            company = %company.name,
            reason = %reason,
            "Enrichment needed but no provider or domain available"
        );
        report.company = company;
        return Ok(report);
    };

    tracing::info!(
        company = %company.name,
        domain = %lookup_domain,
        reason = %reason,
        "Enriching company"
    );
    let profile = fetch_profile(provider, lookup_domain).await;
    if profile.is_empty() {
        report.company = company;
        return Ok(report);
    }

    store
        .record_usage(Some(&company.id), UsageEndpoint::Enrich, lookup_domain, ENRICH_CREDITS)
        .await?;
    report.credits += ENRICH_CREDITS;

    let outcome = apply_profile(&mut company, &profile, Utc::now());
    company = store.update_company(&company).await?;
    store
        .add_company_industries(&company.id, &outcome.industries)
        .await?;
    report.enriched = outcome.stamped;
    tracing::info!(
        company = %company.name,
        filled = ?outcome.filled,
        industries = outcome.industries.len(),
        "Applied enrichment profile"
    );

    if is_new && outcome.stamped {
        let base_domain = company.domain.clone().unwrap_or_else(|| lookup_domain.to_string());
        let discovery = discover_competitors(state, &company, &base_domain, false).await?;
        report.competitors_added = discovery.linked;
        report.credits += discovery.credits;
    }

    report.company = store
        .get_company(&company.id)
        .await?
        .unwrap_or(company);
    Ok(report)
}

/// Outcome of one similar-companies lookup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// False when the lookup was skipped or nothing survived filtering, so
    /// the existing links were kept.
    pub replaced: bool,
    pub linked: usize,
    pub credits: i64,
}

/// Replaces the competitor set of `company` with a fresh similar-companies
/// lookup. The current links survive a skipped, failed or empty lookup.
pub async fn refresh_competitors(state: &AppState, company: &Company) -> Result<Discovery> {
    let domain = company
        .domain
        .as_deref()
        .map(clean_domain)
        .filter(|d| !d.is_empty());
    let (Some(_), Some(domain)) = (state.enricher(), domain) else {
        tracing::info!(company = %company.name, "No provider or domain, keeping current competitors");
        return Ok(Discovery::default());
    };
    discover_competitors(state, company, &domain, true).await
}

/// One similar-companies call: filter, find-or-create and link every kept
/// candidate, capturing a baseline snapshot for pairs not observed before. With `replace`, the existing
/// links are dropped first, but only when some candidate survived filtering.
async fn discover_competitors(
    state: &AppState,
    company: &Company,
    base_domain: &str,
    replace: bool,
) -> Result<Discovery> {
    let Some(provider) = state.enricher() else {
        return Ok(Discovery::default());
    };
    let store = state.store.as_ref();
    let limit = state
        .config
        .enrichment
        .similar_limit
        .min(rivalwatch_enrich::SIMILAR_LIMIT);

    let similar = fetch_similar(provider, base_domain, limit).await;
    let credits = SIMILAR_CREDITS_PER_COMPANY * similar.len() as i64;
    store
        .record_usage(Some(&company.id), UsageEndpoint::Similar, base_domain, credits)
        .await?;

    let returned = similar.len();
    let candidates = filter_competitors(&company.name, base_domain, similar);
    let replaced = replace && !candidates.is_empty();
    if replaced {
        let removed = store.unlink_all_competitors(&company.id).await?;
        tracing::info!(company = %company.name, removed, "Dropped previous competitor links");
    }
    let mut added = 0;
    for profile in &candidates {
        let Some(competitor) = upsert_competitor(store, profile).await? else {
            continue;
        };
        if competitor.id == company.id {
            continue;
        }
        if store.link_competitor(&company.id, &competitor.id).await? {
            added += 1;
        }
        // re-linked competitors keep their history; only new pairs get a baseline
        if store.latest_snapshot(&company.id, &competitor.id).await?.is_none() {
            snapshots::capture(store, company, &competitor, &competitor).await?;
        }
    }

    tracing::info!(
        company = %company.name,
        returned,
        kept = candidates.len(),
        added,
        credits,
        "Discovered competitors"
    );
    Ok(Discovery {
        replaced,
        linked: added,
        credits,
    })
}

/// Finds a competitor by domain, then by name, or creates it. Existing
/// records only get their empty fields filled.
async fn upsert_competitor(store: &IntelStore, profile: &CompanyProfile) -> Result<Option<Company>> {
    let Some(domain) = profile.domain.as_deref().filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    let name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(domain);

    let existing = match store.find_company_by_domain(domain).await? {
        Some(company) => Some(company),
        None => store.find_company_by_name(name).await?,
    };

    let mut competitor = match existing {
        Some(company) => company,
        None => match store.create_company(name, Some(domain)).await {
            Ok(company) => company,
            // lost a race against a concurrent signup creating the same name
            Err(StorageError::Invalid { .. }) => match store.find_company_by_name(name).await? {
                Some(company) => company,
                None => return Ok(None),
            },
            Err(e) => return Err(e.into()),
        },
    };

    let filled = fill_missing(&mut competitor, profile);
    if !filled.is_empty() {
        competitor = store.update_company(&competitor).await?;
    }
    if store
        .add_company_industries(&competitor.id, &profile.industries)
        .await?
        > 0
    {
        if let Some(reloaded) = store.get_company(&competitor.id).await? {
            competitor = reloaded;
        }
    }
    Ok(Some(competitor))
}
