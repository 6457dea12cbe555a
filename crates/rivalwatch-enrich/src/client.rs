use async_trait::async_trait;
use reqwest::Client;

use crate::domain::is_valid_domain;
use crate::error::{EnrichError, Result};
use crate::models::{CompanyProfile, CompanyRecord, SimilarRequest, SimilarResponse};
use crate::CompanyDataProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.companyenrich.com";

/// HTTP client for the CompanyEnrich API.
#[derive(Clone)]
pub struct CompanyEnrichClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl CompanyEnrichClient {
    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs.unwrap_or(30)))
            .build()?;
        Ok(Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(EnrichError::Http {
            provider: self.name().to_string(),
            status,
            body,
        })
    }
}

#[async_trait]
impl CompanyDataProvider for CompanyEnrichClient {
    fn name(&self) -> &str {
        "companyenrich"
    }

    async fn enrich(&self, domain: &str) -> Result<CompanyProfile> {
        if !is_valid_domain(domain) {
            return Err(EnrichError::InvalidDomain(domain.to_string()));
        }
        tracing::debug!(domain = %domain, "Calling enrichment endpoint");

        let resp = self
            .client
            .get(format!("{}/companies/enrich", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("domain", domain)])
            .send()
            .await?;
        let body = self.check(resp).await?.text().await?;
        let record: CompanyRecord = serde_json::from_str(&body)?;
        Ok(record.into())
    }

    async fn similar(&self, domain: &str, limit: usize) -> Result<Vec<CompanyProfile>> {
        if !is_valid_domain(domain) {
            return Err(EnrichError::InvalidDomain(domain.to_string()));
        }
        tracing::debug!(domain = %domain, limit, "Calling similar-companies endpoint");

        let resp = self
            .client
            .post(format!("{}/companies/similar", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SimilarRequest {
                domain,
                page_size: limit,
            })
            .send()
            .await?;
        let body = self.check(resp).await?.text().await?;
        let parsed: SimilarResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .items
            .into_iter()
            .take(limit)
            .map(CompanyProfile::from)
            .collect())
    }
}
