use rivalwatch_common::types::{Company, MarketPositioning};
use serde_json::{Map, Value};

use crate::prompt::{build_landscape_prompt, build_positioning_prompt};
use crate::{GenerationRequest, TextGenerator};

/// Shown (and cached) whenever no landscape could be generated.
pub const DEFAULT_LANDSCAPE: &str = "Competitive landscape analysis is being prepared. \
This section will provide insights into market positioning, competitive pressures, \
and strategic considerations based on available company and competitor data.";

pub const DEFAULT_POSITIONING_FIELD: &str = "Analysis not available.";
pub const DEFAULT_POSITIONING_SUMMARY: &str = "Market positioning analysis is being prepared.";

const LANDSCAPE_TEMPERATURE: f32 = 0.7;
const LANDSCAPE_MAX_TOKENS: usize = 300;
const POSITIONING_TEMPERATURE: f32 = 0.7;
const POSITIONING_MAX_TOKENS: usize = 800;

/// Removes a surrounding markdown code fence (optionally tagged `json`).
///
/// ```
/// use rivalwatch_ai::strip_json_fences;
///
/// assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_json_fences("  {}  "), "{}");
/// ```
pub fn strip_json_fences(content: &str) -> &str {
    let content = content.trim();
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    let inner = inner.trim_start();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

fn competitor_names(competitors: &[Company]) -> Vec<String> {
    competitors
        .iter()
        .map(|c| c.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Produces the landscape text for a company. Falls back to
/// [`DEFAULT_LANDSCAPE`] when no generator is configured, the company has no
/// competitors yet, or the backend fails.
pub async fn generate_landscape(
    generator: Option<&dyn TextGenerator>,
    company: &Company,
    competitors: &[Company],
) -> String {
    let Some(generator) = generator else {
        return DEFAULT_LANDSCAPE.to_string();
    };
    if competitors.is_empty() {
        tracing::debug!(company = %company.name, "No competitors, skipping landscape generation");
        return DEFAULT_LANDSCAPE.to_string();
    }

    let request = GenerationRequest::new(build_landscape_prompt(
        company,
        &competitor_names(competitors),
    ))
    .with_limits(LANDSCAPE_TEMPERATURE, LANDSCAPE_MAX_TOKENS);

    match generator.generate(&request).await {
        Ok(text) => {
            tracing::info!(
                company = %company.name,
                provider = generator.provider(),
                model = generator.model_name(),
                "Generated competitive landscape"
            );
            text
        }
        Err(e) => {
            tracing::warn!(company = %company.name, error = %e, "Landscape generation failed");
            DEFAULT_LANDSCAPE.to_string()
        }
    }
}

fn field(data: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                fallback.to_string()
            } else {
                parts.join(" ")
            }
        }
        _ => fallback.to_string(),
    }
}

fn positioning_from(data: &Map<String, Value>) -> MarketPositioning {
    MarketPositioning {
        value_proposition: field(data, "value_proposition", DEFAULT_POSITIONING_FIELD),
        competitive_edge: field(data, "competitive_edge", DEFAULT_POSITIONING_FIELD),
        brand_perception: field(data, "brand_perception", DEFAULT_POSITIONING_FIELD),
        key_segments: field(data, "key_segments", DEFAULT_POSITIONING_FIELD),
        weaknesses: field(data, "weaknesses", DEFAULT_POSITIONING_FIELD),
        opportunity_areas: field(data, "opportunity_areas", DEFAULT_POSITIONING_FIELD),
        summary: field(data, "summary", DEFAULT_POSITIONING_SUMMARY),
    }
}

/// Produces the structured positioning analysis. Missing or unparseable
/// fields fall back to fixed placeholder text; this never fails.
pub async fn generate_positioning(
    generator: Option<&dyn TextGenerator>,
    company: &Company,
    competitors: &[Company],
) -> MarketPositioning {
    let empty = Map::new();
    let Some(generator) = generator else {
        return positioning_from(&empty);
    };

    let request = GenerationRequest::new(build_positioning_prompt(
        company,
        &competitor_names(competitors),
    ))
    .with_limits(POSITIONING_TEMPERATURE, POSITIONING_MAX_TOKENS);

    let raw = match generator.generate(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(company = %company.name, error = %e, "Positioning generation failed");
            return positioning_from(&empty);
        }
    };

    match serde_json::from_str::<Value>(strip_json_fences(&raw)) {
        Ok(Value::Object(data)) => positioning_from(&data),
        Ok(_) => {
            tracing::warn!(company = %company.name, "Positioning response is not a JSON object");
            positioning_from(&empty)
        }
        Err(e) => {
            tracing::warn!(company = %company.name, error = %e, "Positioning response is not valid JSON");
            positioning_from(&empty)
        }
    }
}
