use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use rivalwatch_common::types::{Company, MarketPositioning};
use std::collections::HashMap;

use crate::auth::AuthContext;
use crate::pages::{
    fill, format_count, format_funding, format_time, html_escape, markdown_to_html,
    message_page, or_unknown, render_page, signals_table, PageError, PageResult,
};
use crate::services::insights;
use crate::state::AppState;

const COMPANY: &str = include_str!("templates/company.html");

const COMPETITOR_SIGNALS: u64 = 50;

fn link_or_unknown(url: Option<&str>) -> String {
    match url.map(str::trim).filter(|u| u.starts_with("http://") || u.starts_with("https://")) {
        Some(url) => {
            let escaped = html_escape(url);
            format!(r#"<a href="{escaped}" rel="noopener noreferrer">{escaped}</a>"#)
        }
        None => or_unknown(url),
    }
}

fn location(company: &Company) -> String {
    let parts: Vec<&str> = [company.city.as_deref(), company.country.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        or_unknown(None)
    } else {
        html_escape(&parts.join(", "))
    }
}

/// Profile card shared by the company and competitor pages.
fn profile_page(kind: &str, company: &Company, sections: &str) -> String {
    let name = html_escape(&company.name);
    let headline = html_escape(company.headline.as_deref().unwrap_or(""));
    let domain = or_unknown(company.domain.as_deref());
    let website = link_or_unknown(company.website.as_deref());
    let employees = format_count(company.number_of_employees);
    let funding = format_funding(company.funding);
    let funding_stage = or_unknown(company.funding_stage.as_deref());
    let location = location(company);
    let industries = if company.industries.is_empty() {
        or_unknown(company.industry.as_deref())
    } else {
        html_escape(&company.industries.join(", "))
    };
    let linkedin = link_or_unknown(company.linkedin_url.as_deref());
    let enriched_at = match &company.enriched_at {
        Some(at) => format_time(at),
        None => "Never".to_string(),
    };

    fill(
        COMPANY,
        &[
            ("kind", kind),
            ("name", name.as_str()),
            ("headline", headline.as_str()),
            ("domain", domain.as_str()),
            ("website", website.as_str()),
            ("employees", employees.as_str()),
            ("funding", funding.as_str()),
            ("funding_stage", funding_stage.as_str()),
            ("location", location.as_str()),
            ("industries", industries.as_str()),
            ("linkedin", linkedin.as_str()),
            ("enriched_at", enriched_at.as_str()),
            ("sections", sections),
        ],
    )
}

fn positioning_section(positioning: &MarketPositioning) -> String {
    let fields = [
        ("Value proposition", &positioning.value_proposition),
        ("Competitive edge", &positioning.competitive_edge),
        ("Brand perception", &positioning.brand_perception),
        ("Key segments", &positioning.key_segments),
        ("Weaknesses", &positioning.weaknesses),
        ("Opportunity areas", &positioning.opportunity_areas),
    ];
    let rows: String = fields
        .iter()
        .map(|(label, text)| format!("<tr><th>{label}</th><td>{}</td></tr>", html_escape(text)))
        .collect();
    format!(
        r#"<section class="card"><h2>Market positioning</h2><p>{}</p><table>{rows}</table></section>"#,
        html_escape(&positioning.summary)
    )
}

fn no_company(ctx: &AuthContext) -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        Some(ctx),
        "No company",
        "Your account is not linked to a company anymore.",
    )
}

/// `/company`: the signed-in user's own company with AI analysis.
async fn company_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> PageResult {
    let Some(company) = ctx.company.as_ref() else {
        return Ok(no_company(&ctx));
    };

    let landscape = insights::ensure_landscape(&state, company).await?;
    let positioning = insights::ensure_positioning(&state, company).await?;

    let sections = format!(
        r#"<section class="card"><h2>Competitive landscape</h2>{}</section>{}"#,
        markdown_to_html(&landscape),
        positioning_section(&positioning)
    );
    let content = profile_page("Your company", company, &sections);
    Ok(render_page(&company.name, Some(&ctx), "", &content).into_response())
}

/// `/competitor/{id}`: only competitors linked to the user's company.
async fn competitor_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> PageResult {
    let Some(company) = ctx.company.as_ref() else {
        return Ok(no_company(&ctx));
    };
    if !state.store.is_competitor(&company.id, &id).await? {
        return Err(PageError::NotFound);
    }
    let competitor = state
        .store
        .get_company(&id)
        .await?
        .ok_or(PageError::NotFound)?;

    let signals = state
        .store
        .list_competitor_signals(&company.id, &competitor.id, COMPETITOR_SIGNALS)
        .await?;
    let snapshots = state.store.list_snapshots(&company.id, &competitor.id).await?;
    let names = HashMap::from([(competitor.id.clone(), competitor.name.clone())]);

    let tracking = match snapshots.last() {
        Some(latest) => format!(
            r#"<p class="muted">{} snapshot(s), last captured {}.</p>"#,
            snapshots.len(),
            format_time(&latest.created_at)
        ),
        None => r#"<p class="muted">Not observed yet.</p>"#.to_string(),
    };
    let sections = format!(
        r#"<section class="card"><h2>Signals</h2>{tracking}{}</section>"#,
        signals_table(&signals, &names)
    );
    let content = profile_page("Competitor", &competitor, &sections);
    Ok(render_page(&competitor.name, Some(&ctx), "", &content).into_response())
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/company", get(company_page))
        .route("/competitor/{id}", get(competitor_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_links_are_clickable() {
        assert!(link_or_unknown(Some("https://acme.com")).starts_with("<a href"));
        assert_eq!(link_or_unknown(Some("javascript:alert(1)")), "javascript:alert(1)");
        assert!(link_or_unknown(None).contains("Unknown"));
    }

    #[test]
    fn location_joins_known_parts() {
        let mut acme = Company::new("1".into(), "Acme");
        assert!(location(&acme).contains("Unknown"));
        acme.city = Some("Utrecht".into());
        acme.country = Some("Netherlands".into());
        assert_eq!(location(&acme), "Utrecht, Netherlands");
    }
}
