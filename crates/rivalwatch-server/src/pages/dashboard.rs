use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};
use rivalwatch_common::types::{Company, SignalCategory, User};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::{AuthContext, MaybeAuth};
use crate::pages::{
    fill, format_count, format_funding, html_escape, markdown_to_html, message_page,
    notice_flash, or_unknown, render_page, signals_table, PageResult,
};
use crate::services::{insights, onboarding, snapshots};
use crate::state::AppState;

const LANDING: &str = include_str!("templates/landing.html");
const DASHBOARD: &str = include_str!("templates/dashboard.html");
const SIGNALS: &str = include_str!("templates/signals.html");

const DASHBOARD_SIGNALS: u64 = 10;
const SIGNALS_PAGE_LIMIT: u64 = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HomeQuery {
    /// Set after a manual refresh: number of new signals.
    refreshed: Option<usize>,
    /// Set after a competitor refresh: the new count, or `unchanged`.
    competitors: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SignalsQuery {
    category: Option<String>,
}

fn no_company(ctx: &AuthContext) -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        Some(ctx),
        "No company",
        "Your account is not linked to a company anymore.",
    )
}

fn competitor_names(competitors: &[Company]) -> HashMap<String, String> {
    competitors
        .iter()
        .map(|c| (c.id.clone(), c.name.clone()))
        .collect()
}

fn competitors_table(competitors: &[Company]) -> String {
    if competitors.is_empty() {
        return r#"<p class="muted">No competitors identified yet.</p>"#.to_string();
    }
    let rows: String = competitors
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td><a href="/competitor/{}">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                html_escape(&c.id),
                html_escape(&c.name),
                or_unknown(c.domain.as_deref()),
                format_count(c.number_of_employees),
                format_funding(c.funding),
                or_unknown(c.funding_stage.as_deref()),
            )
        })
        .collect();
    format!(
        "<table><tr><th>Name</th><th>Domain</th><th>Employees</th><th>Funding</th><th>Stage</th></tr>{rows}</table>"
    )
}

fn team_list(users: &[User]) -> String {
    if users.is_empty() {
        return r#"<p class="muted">No active team members.</p>"#.to_string();
    }
    let items: String = users
        .iter()
        .map(|u| match u.role.as_deref() {
            Some(role) => format!(
                r#"<li>{} <span class="muted">{}</span></li>"#,
                html_escape(&u.display_name()),
                html_escape(role)
            ),
            None => format!("<li>{}</li>", html_escape(&u.display_name())),
        })
        .collect();
    format!("<ul>{items}</ul>")
}

/// `/`: landing page for guests, dashboard for signed-in users.
async fn home(
    State(state): State<AppState>,
    MaybeAuth(ctx): MaybeAuth,
    Query(query): Query<HomeQuery>,
) -> PageResult {
    let Some(ctx) = ctx else {
        return Ok(render_page("Welcome", None, "", LANDING).into_response());
    };
    let Some(company) = ctx.company.clone() else {
        return Ok(no_company(&ctx));
    };
    let store = &state.store;

    let users = store.list_company_users(&company.id).await?;
    let competitors = store.list_competitors(&company.id).await?;
    let credits = store.credits_for_company(&company.id).await?;
    let unread = store.count_unread_signals(&company.id).await?;
    let signals = store
        .list_signals(&company.id, None, DASHBOARD_SIGNALS)
        .await?;
    let landscape = insights::ensure_landscape(&state, &company).await?;

    let company_name = html_escape(&company.name);
    let headline = html_escape(company.headline.as_deref().unwrap_or(""));
    let user_count = users.len().to_string();
    let competitor_count = competitors.len().to_string();
    let industry_count = company.industries.len().to_string();
    let total_funding = format_funding(company.funding);
    let credits_used = credits.to_string();
    let landscape_html = markdown_to_html(&landscape);
    let unread_total = unread.total().to_string();
    let unread_hiring = unread.hiring.to_string();
    let unread_product = unread.product.to_string();
    let unread_funding = unread.funding.to_string();
    let signals_html = signals_table(&signals, &competitor_names(&competitors));
    let competitors_html = competitors_table(&competitors);
    let team_html = team_list(&users);

    let content = fill(
        DASHBOARD,
        &[
            ("company_name", company_name.as_str()),
            ("company_headline", headline.as_str()),
            ("user_count", user_count.as_str()),
            ("competitor_count", competitor_count.as_str()),
            ("industry_count", industry_count.as_str()),
            ("total_funding", total_funding.as_str()),
            ("credits_used", credits_used.as_str()),
            ("landscape_html", landscape_html.as_str()),
            ("unread_total", unread_total.as_str()),
            ("unread_hiring", unread_hiring.as_str()),
            ("unread_product", unread_product.as_str()),
            ("unread_funding", unread_funding.as_str()),
            ("signals_table", signals_html.as_str()),
            ("competitors_table", competitors_html.as_str()),
            ("team_list", team_html.as_str()),
        ],
    );

    let flash = match (query.refreshed, query.competitors.as_deref()) {
        (Some(0), _) => notice_flash("Signals refreshed. No changes detected."),
        (Some(n), _) => notice_flash(&format!("Signals refreshed. {n} new signal(s).")),
        (None, Some("unchanged")) => {
            notice_flash("No new competitors found. Your current list was kept.")
        }
        (None, Some(n)) if n.parse::<usize>().is_ok() => {
            notice_flash(&format!("Competitors refreshed. Now tracking {n} competitor(s)."))
        }
        _ => String::new(),
    };
    Ok(render_page(&company.name, Some(&ctx), &flash, &content).into_response())
}

fn category_filters(selected: Option<SignalCategory>) -> String {
    let mut links = Vec::with_capacity(SignalCategory::ALL.len() + 1);
    links.push(match selected {
        None => "<strong>All</strong>".to_string(),
        Some(_) => r#"<a href="/signals">All</a>"#.to_string(),
    });
    for category in SignalCategory::ALL {
        links.push(if selected == Some(category) {
            format!("<strong>{}</strong>", category.label())
        } else {
            format!(
                r#"<a href="/signals?category={}">{}</a>"#,
                category.as_str(),
                category.label()
            )
        });
    }
    links.join(" · ")
}

/// Lists signals, optionally by category, then marks the company's
/// signals as read. Badges reflect the state before this visit.
async fn signals_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<SignalsQuery>,
) -> PageResult {
    let Some(company) = ctx.company.clone() else {
        return Ok(no_company(&ctx));
    };

    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<SignalCategory>() {
            Ok(category) => Some(category),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unknown signal category filter");
                None
            }
        },
    };

    let signals = state
        .store
        .list_signals(&company.id, category, SIGNALS_PAGE_LIMIT)
        .await?;
    let competitors = state.store.list_competitors(&company.id).await?;
    let marked = state.store.mark_signals_read(&company.id, None).await?;
    if marked > 0 {
        tracing::info!(company = %company.name, marked, "Marked signals as read");
    }

    let filters = category_filters(category);
    let table = signals_table(&signals, &competitor_names(&competitors));
    let content = fill(
        SIGNALS,
        &[("filters", filters.as_str()), ("signals_table", table.as_str())],
    );
    Ok(render_page("Signals", Some(&ctx), "", &content).into_response())
}

async fn refresh(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> PageResult {
    let Some(company) = ctx.company.as_ref() else {
        return Ok(no_company(&ctx));
    };
    let report = snapshots::refresh_signals(&state, company).await?;
    Ok(Redirect::to(&format!("/?refreshed={}", report.signals)).into_response())
}

async fn refresh_competitor_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> PageResult {
    let Some(company) = ctx.company.as_ref() else {
        return Ok(no_company(&ctx));
    };
    let discovery = onboarding::refresh_competitors(&state, company).await?;
    let target = if discovery.replaced {
        format!("/?competitors={}", discovery.linked)
    } else {
        "/?competitors=unchanged".to_string()
    };
    Ok(Redirect::to(&target).into_response())
}

/// `/` serves guests too, so it lives outside the session guard.
pub fn home_routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}

pub fn signal_routes() -> Router<AppState> {
    Router::new()
        .route("/signals", get(signals_page))
        .route("/signals/refresh", post(refresh))
        .route("/competitors/refresh", post(refresh_competitor_list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_highlight_selection() {
        let all = category_filters(None);
        assert!(all.starts_with("<strong>All</strong>"));
        assert!(all.contains(r#"href="/signals?category=hiring""#));

        let funding = category_filters(Some(SignalCategory::Funding));
        assert!(funding.contains("<strong>Funding</strong>"));
        assert!(funding.contains(r#"<a href="/signals">All</a>"#));
    }

    #[test]
    fn team_list_shows_roles() {
        let mut ada = User {
            id: "1".into(),
            email: "ada@acme.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Some("CTO".into()),
            company_id: None,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(team_list(std::slice::from_ref(&ada)).contains("CTO"));
        ada.role = None;
        assert!(!team_list(&[ada]).contains("muted"));
    }
}
