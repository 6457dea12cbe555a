//! Client and policy for the paid company-data provider.
//!
//! - [`gating`] decides *whether* a paid call is allowed.
//! - [`CompanyDataProvider`] performs the call ([`client::CompanyEnrichClient`]).
//! - [`merge`] folds the answer into a
//!   [`Company`](rivalwatch_common::types::Company) without clobbering
//!   manually entered data.
//! - [`filter`] removes the base company's own brands from similar-company
//!   results.

pub mod client;
pub mod domain;
pub mod error;
pub mod filter;
pub mod gating;
pub mod merge;
pub mod models;

use async_trait::async_trait;

pub use client::CompanyEnrichClient;
pub use gating::{enrichment_reason, needs_enrichment, EnrichReason};
pub use merge::{apply_profile, fill_missing, overlay_profile, MergeOutcome};
pub use models::CompanyProfile;

/// Credits charged by the enrichment endpoint per call.
pub const ENRICH_CREDITS: i64 = 1;
/// Credits charged by the similar-companies endpoint per company returned.
pub const SIMILAR_CREDITS_PER_COMPANY: i64 = 5;
/// Maximum number of similar companies requested at signup.
pub const SIMILAR_LIMIT: usize = 5;

/// Company-data provider abstraction.
#[async_trait]
pub trait CompanyDataProvider: Send + Sync {
    /// Provider name used in logs (e.g. `"companyenrich"`).
    fn name(&self) -> &str;

    /// Looks a company up by domain. Costs [`ENRICH_CREDITS`].
    async fn enrich(&self, domain: &str) -> error::Result<CompanyProfile>;

    /// Companies similar to `domain`, at most `limit`. Costs
    /// [`SIMILAR_CREDITS_PER_COMPANY`] per returned company.
    async fn similar(&self, domain: &str, limit: usize) -> error::Result<Vec<CompanyProfile>>;
}

/// Calls [`CompanyDataProvider::enrich`], turning any failure into
/// [`CompanyProfile::default()`].
pub async fn fetch_profile(provider: &dyn CompanyDataProvider, domain: &str) -> CompanyProfile {
    match provider.enrich(domain).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                domain = %domain,
                error = %e,
                "Enrichment failed, continuing with stored data"
            );
            CompanyProfile::default()
        }
    }
}

/// Calls [`CompanyDataProvider::similar`], turning any failure into an
/// empty list.
pub async fn fetch_similar(
    provider: &dyn CompanyDataProvider,
    domain: &str,
    limit: usize,
) -> Vec<CompanyProfile> {
    match provider.similar(domain, limit).await {
        Ok(mut items) => {
            items.truncate(limit);
            items
        }
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                domain = %domain,
                error = %e,
                "Similar-companies lookup failed"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;

    struct Failing;

    #[async_trait]
    impl CompanyDataProvider for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn enrich(&self, domain: &str) -> error::Result<CompanyProfile> {
            Err(EnrichError::InvalidDomain(domain.to_string()))
        }

        async fn similar(&self, domain: &str, _limit: usize) -> error::Result<Vec<CompanyProfile>> {
            Err(EnrichError::InvalidDomain(domain.to_string()))
        }
    }

    #[tokio::test]
    async fn failures_fall_back_to_empty_results() {
        let profile = fetch_profile(&Failing, "acme.com").await;
        assert!(profile.is_empty());
        assert!(fetch_similar(&Failing, "acme.com", 5).await.is_empty());
    }
}
