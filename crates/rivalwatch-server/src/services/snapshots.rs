use anyhow::Result;
use rivalwatch_common::types::{Company, Signal, Snapshot};
use rivalwatch_enrich::{fetch_profile, fill_missing, overlay_profile, ENRICH_CREDITS};
use rivalwatch_signals::{derive_signals, diff, Observation};
use rivalwatch_storage::store::UsageEndpoint;
use rivalwatch_storage::IntelStore;

use crate::state::AppState;

/// Appends a snapshot of `observed` for the `company` → `competitor` pair and
/// persists the signals derived from the diff against the previous one.
pub async fn capture(
    store: &IntelStore,
    company: &Company,
    competitor: &Company,
    observed: &Company,
) -> Result<(Snapshot, Vec<Signal>)> {
    let document = Observation::from_company(observed).to_document();
    let (snapshot, signals) = store
        .capture_snapshot(&company.id, &competitor.id, document, |previous, current| {
            let changes = diff(previous, current);
            derive_signals(company, competitor, &changes)
        })
        .await?;

    tracing::debug!(
        company = %company.name,
        competitor = %competitor.name,
        snapshot_id = %snapshot.id,
        signals = signals.len(),
        "Captured competitor snapshot"
    );
    Ok((snapshot, signals))
}

/// Outcome of a manual signal refresh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub competitors: usize,
    /// Competitors for which the provider returned fresh data.
    pub fetched: usize,
    pub signals: usize,
    pub credits: i64,
}

/// Re-observes every competitor of `company` and records new signals.
///
/// Each competitor with a domain is fetched fresh (one credit each). The
/// observation overlays the fresh values on the latest snapshot, so fields
/// the provider omits keep their last observed value. Competitors whose
/// fetch fails or comes back empty are not captured. Without a provider
/// nothing is observed.
pub async fn refresh_signals(state: &AppState, company: &Company) -> Result<RefreshReport> {
    let store = state.store.as_ref();
    let competitors = store.list_competitors(&company.id).await?;
    let mut report = RefreshReport {
        competitors: competitors.len(),
        ..Default::default()
    };

    let Some(provider) = state.enricher() else {
        tracing::info!(company = %company.name, "No enrichment key configured, skipping signal refresh");
        return Ok(report);
    };

    for mut competitor in competitors {
        let Some(domain) = competitor.domain.clone().filter(|d| !d.trim().is_empty()) else {
            continue;
        };
        let profile = fetch_profile(provider, &domain).await;
        if profile.is_empty() {
            tracing::debug!(competitor = %competitor.name, domain = %domain, "No fresh data, keeping last snapshot");
            continue;
        }
        store
            .record_usage(Some(&company.id), UsageEndpoint::Enrich, &domain, ENRICH_CREDITS)
            .await?;
        report.credits += ENRICH_CREDITS;
        report.fetched += 1;

        let mut baseline = competitor.clone();
        if let Some(previous) = store
            .latest_snapshot(&company.id, &competitor.id)
            .await?
            .and_then(|s| Observation::from_document(&s.data))
        {
            previous.apply_to(&mut baseline);
        }
        let observed = overlay_profile(&baseline, &profile);
        let (_, signals) = capture(store, company, &competitor, &observed).await?;
        report.signals += signals.len();

        let filled = fill_missing(&mut competitor, &profile);
        if !filled.is_empty() {
            store.update_company(&competitor).await?;
        }
        store
            .add_company_industries(&competitor.id, &profile.industries)
            .await?;
    }

    tracing::info!(
        company = %company.name,
        competitors = report.competitors,
        fetched = report.fetched,
        signals = report.signals,
        credits = report.credits,
        "Refreshed competitor signals"
    );
    Ok(report)
}
