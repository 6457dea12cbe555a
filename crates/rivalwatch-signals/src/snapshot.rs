use rivalwatch_common::types::Company;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The observable attributes of a competitor at capture time.
///
/// Serialises to the snapshot document stored in `company_snapshots.data`.
/// Industries are sorted and de-duplicated so that ordering differences
/// coming from the provider never look like a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    pub domain: Option<String>,
    pub country: Option<String>,
    pub headline: Option<String>,
    pub employees: Option<i64>,
    pub industries: Vec<String>,
    pub funding: Option<i64>,
    pub funding_stage: Option<String>,
}

impl Observation {
    /// Observes the stored state of a company record.
    pub fn from_company(company: &Company) -> Self {
        let mut industries = company.industries.clone();
        if industries.is_empty() {
            if let Some(industry) = company.industry.as_deref() {
                industries.push(industry.to_string());
            }
        }
        Self {
            name: company.name.clone(),
            domain: company.domain.clone(),
            country: company.country.clone(),
            headline: company.headline.clone(),
            employees: company.number_of_employees,
            industries,
            funding: company.funding,
            funding_stage: company.funding_stage.clone(),
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        self.industries = self
            .industries
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        self.industries.sort_by_key(|i| i.to_lowercase());
        self.industries.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        self.headline = self
            .headline
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        self
    }

    /// Reads a stored snapshot document back. `None` for documents that do
    /// not have the observation shape.
    pub fn from_document(document: &Value) -> Option<Self> {
        serde_json::from_value::<Self>(document.clone())
            .ok()
            .map(Self::normalized)
    }

    /// Writes the observed attributes onto `company`, leaving everything the
    /// snapshot does not track untouched.
    pub fn apply_to(&self, company: &mut Company) {
        company.domain = self.domain.clone();
        company.country = self.country.clone();
        company.headline = self.headline.clone();
        company.number_of_employees = self.employees;
        company.industries = self.industries.clone();
        company.funding = self.funding;
        company.funding_stage = self.funding_stage.clone();
    }

    /// The JSON document stored for this observation.
    pub fn to_document(&self) -> Value {
        let normalized = self.clone().normalized();
        serde_json::json!({
            "name": normalized.name,
            "domain": normalized.domain,
            "country": normalized.country,
            "headline": normalized.headline,
            "employees": normalized.employees,
            "industries": normalized.industries,
            "funding": normalized.funding,
            "funding_stage": normalized.funding_stage,
        })
    }
}
