use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::clean_domain;

/// Parses loosely formatted numbers: `1200`, `"1,200"`, `"10k"`,
/// `"2.5B"`, `"51-200"` (first number wins). Placeholders such as
/// `"unknown"` or `"n/a"` become `None`.
///
/// ```
/// use rivalwatch_enrich::models::parse_numeric;
/// use serde_json::json;
///
/// assert_eq!(parse_numeric(&json!("2.5M")), Some(2_500_000));
/// assert_eq!(parse_numeric(&json!("51-200")), Some(51));
/// assert_eq!(parse_numeric(&json!("unknown")), None);
/// ```
pub fn parse_numeric(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(raw: &str) -> Option<i64> {
    let cleaned = raw.trim().to_lowercase().replace([',', '$', '+'], "");
    if matches!(cleaned.as_str(), "" | "unknown" | "n/a" | "null" | "none") {
        return None;
    }

    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let rest = &cleaned[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let number: f64 = rest[..end].parse().ok()?;

    let multiplier = match rest[end..].trim_start().chars().next() {
        Some('k') => 1_000.0,
        Some('m') => 1_000_000.0,
        Some('b') => 1_000_000_000.0,
        _ => 1.0,
    };
    Some((number * multiplier) as i64)
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_numeric))
}

/// Accepts either a plain string or an object with a `name` field.
fn name_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NameInput {
        Plain(String),
        Named { name: Option<String> },
        Other(Value),
    }

    Ok(match Option::<NameInput>::deserialize(deserializer)? {
        Some(NameInput::Plain(s)) => Some(s),
        Some(NameInput::Named { name }) => name,
        Some(NameInput::Other(_)) | None => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "name_or_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "name_or_string")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Financial {
    #[serde(default, alias = "funding", deserialize_with = "lenient_i64")]
    pub total_funding: Option<i64>,
    #[serde(default)]
    pub funding_stage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Socials {
    #[serde(default, alias = "linkedin")]
    pub linkedin_url: Option<String>,
}

/// Raw company document as returned by the enrichment endpoint. Every
/// field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "employee_count", deserialize_with = "lenient_i64")]
    pub employees: Option<i64>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Slash-delimited paths such as `"Technology/Software/SaaS"`.
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub financial: Option<Financial>,
    #[serde(default)]
    pub socials: Option<Socials>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of the similar-companies endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarResponse {
    #[serde(default, alias = "companies", alias = "data")]
    pub items: Vec<CompanyRecord>,
}

/// Request body of the similar-companies endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarRequest<'a> {
    pub domain: &'a str,
    pub page_size: usize,
}

/// Normalised view of a provider record. `CompanyProfile::default()` is the
/// fallback used whenever the provider cannot be reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub headline: Option<String>,
    pub employees: Option<i64>,
    pub funding: Option<i64>,
    pub funding_stage: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub industry: Option<String>,
    pub industries: Vec<String>,
    pub linkedin_url: Option<String>,
    /// Provider-side freshness timestamp, when the provider sends one.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CompanyProfile {
    /// True when the provider gave us nothing usable.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Takes the last segment of a slash-delimited industry path.
pub fn industry_label(path: &str) -> Option<String> {
    path.rsplit('/')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

impl From<CompanyRecord> for CompanyProfile {
    fn from(record: CompanyRecord) -> Self {
        let mut industries: Vec<String> = record
            .industries
            .iter()
            .filter_map(|path| industry_label(path))
            .collect();
        industries.sort_by_key(|i| i.to_lowercase());
        industries.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let industry = non_empty(record.industry).or_else(|| industries.first().cloned());
        let location = record.location.unwrap_or_default();
        let financial = record.financial.unwrap_or_default();
        let socials = record.socials.unwrap_or_default();

        Self {
            name: non_empty(record.name),
            domain: non_empty(record.domain)
                .map(|d| clean_domain(&d))
                .filter(|d| !d.is_empty()),
            website: non_empty(record.website),
            headline: non_empty(record.description),
            employees: record.employees,
            funding: financial.total_funding,
            funding_stage: non_empty(financial.funding_stage),
            country: non_empty(location.country),
            city: non_empty(location.city),
            industry,
            industries,
            linkedin_url: non_empty(socials.linkedin_url),
            fetched_at: record.updated_at,
        }
    }
}
