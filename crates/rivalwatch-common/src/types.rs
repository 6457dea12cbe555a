use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A tracked organisation. The same row may belong to users (tracking
/// company) and appear as another company's competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub headline: Option<String>,
    pub number_of_employees: Option<i64>,
    pub funding: Option<i64>,
    pub funding_stage: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub industry: Option<String>,
    pub linkedin_url: Option<String>,
    /// Time of the last successful enrichment fetch. `None` means the
    /// provider has never answered for this company.
    pub enriched_at: Option<DateTime<Utc>>,
    pub competitive_landscape: Option<String>,
    /// Industry labels, sorted by name.
    #[serde(default)]
    pub industries: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// A company that has not been persisted yet.
    pub fn new(id: String, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            domain: None,
            website: None,
            headline: None,
            number_of_employees: None,
            funding: None,
            funding_stage: None,
            country: None,
            city: None,
            industry: None,
            linkedin_url: None,
            enriched_at: None,
            competitive_landscape: None,
            industries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub company_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub company_id: Option<String>,
}

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Dashboard grouping of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalCategory {
    Hiring,
    Product,
    Funding,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 3] = [Self::Hiring, Self::Product, Self::Funding];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hiring => "hiring",
            Self::Product => "product",
            Self::Funding => "funding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hiring => "Hiring",
            Self::Product => "Product",
            Self::Funding => "Funding",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hiring" => Ok(Self::Hiring),
            "product" => Ok(Self::Product),
            "funding" => Ok(Self::Funding),
            other => Err(UnknownVariant {
                kind: "signal category",
                value: other.to_string(),
            }),
        }
    }
}

/// Signal severity, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use rivalwatch_common::types::SignalSeverity;
///
/// let sev: SignalSeverity = "medium".parse().unwrap();
/// assert_eq!(sev, SignalSeverity::Medium);
/// assert_eq!(sev.to_string(), "medium");
/// assert!(SignalSeverity::High > SignalSeverity::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSeverity {
    Low,
    Medium,
    High,
}

impl SignalSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for SignalSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSeverity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(UnknownVariant {
                kind: "signal severity",
                value: other.to_string(),
            }),
        }
    }
}

/// A signal ready to be persisted, produced by the diff step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDraft {
    pub company_id: String,
    pub competitor_id: String,
    pub signal_type: String,
    pub category: SignalCategory,
    pub severity: SignalSeverity,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub id: String,
    pub company_id: String,
    pub competitor_id: String,
    pub signal_type: String,
    pub category: SignalCategory,
    pub severity: SignalSeverity,
    pub message: String,
    pub details: Option<Value>,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only capture of a competitor's observed attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub id: String,
    pub company_id: String,
    pub competitor_id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPositioning {
    pub value_proposition: String,
    pub competitive_edge: String,
    pub brand_perception: String,
    pub key_segments: String,
    pub weaknesses: String,
    pub opportunity_areas: String,
    pub summary: String,
}

/// Unread signal counts for one company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnreadCounts {
    pub hiring: u64,
    pub product: u64,
    pub funding: u64,
}

impl UnreadCounts {
    pub fn total(&self) -> u64 {
        self.hiring + self.product + self.funding
    }

    pub fn add(&mut self, category: SignalCategory, count: u64) {
        match category {
            SignalCategory::Hiring => self.hiring += count,
            SignalCategory::Product => self.product += count,
            SignalCategory::Funding => self.funding += count,
        }
    }
}
