//! Server-rendered HTML pages.
//!
//! Templates are plain HTML files compiled into the binary with
//! `include_str!` and filled with `{{key}}` placeholders. Every value
//! substituted into a template must already be HTML-safe: use
//! [`html_escape`] for user data and [`markdown_to_html`] for AI text.

pub mod auth;
pub mod company;
pub mod dashboard;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Event, Options, Parser};
use rivalwatch_common::types::Signal;
use std::collections::HashMap;

use crate::auth::{AuthContext, MaybeAuth};
use crate::state::AppState;

const LAYOUT: &str = include_str!("templates/layout.html");
const MESSAGE: &str = include_str!("templates/message.html");

/// Pages that guests may open.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::auth_routes())
        .merge(dashboard::home_routes())
}

/// Pages behind the session guard.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(company::company_routes())
        .merge(dashboard::signal_routes())
}

/// Error type for page handlers.
pub enum PageError {
    NotFound,
    Internal(anyhow::Error),
}

impl<E> From<E> for PageError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => not_found_page(None),
            Self::Internal(err) => {
                tracing::error!(error = %format!("{err:#}"), "Page handler failed");
                message_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Something went wrong",
                    "We could not load this page. Please try again in a moment.",
                )
            }
        }
    }
}

pub type PageResult<T = Response> = Result<T, PageError>;

/// Fills `{{key}}` placeholders in a single pass. Unknown keys are left
/// in place; substituted values are never re-scanned.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders markdown to HTML. Raw HTML in the source is shown as text.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn nav(ctx: Option<&AuthContext>) -> String {
    match ctx {
        Some(ctx) => format!(
            concat!(
                r#"<a href="/">Dashboard</a><a href="/company">Company</a>"#,
                r#"<a href="/signals">Signals</a><span class="muted">{}</span>"#,
                r#"<form method="post" action="/logout"><button type="submit">Log out</button></form>"#
            ),
            html_escape(&ctx.user.display_name())
        ),
        None => r#"<a href="/login">Log in</a><a href="/signup">Sign up</a>"#.to_string(),
    }
}

/// Error list shown above a form. Messages are escaped here.
pub fn error_flash(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", html_escape(e)))
        .collect();
    format!(r#"<div class="errors"><ul>{items}</ul></div>"#)
}

pub fn notice_flash(message: &str) -> String {
    format!(r#"<div class="notice">{}</div>"#, html_escape(message))
}

/// Wraps page content in the shared layout.
pub fn render_page(
    title: &str,
    ctx: Option<&AuthContext>,
    flash: &str,
    content: &str,
) -> Html<String> {
    let title = html_escape(title);
    let nav = nav(ctx);
    Html(fill(
        LAYOUT,
        &[
            ("title", title.as_str()),
            ("nav", nav.as_str()),
            ("flash", flash),
            ("content", content),
        ],
    ))
}

pub fn message_page(
    status: StatusCode,
    ctx: Option<&AuthContext>,
    heading: &str,
    message: &str,
) -> Response {
    let escaped_heading = html_escape(heading);
    let escaped_message = html_escape(message);
    let content = fill(
        MESSAGE,
        &[
            ("heading", escaped_heading.as_str()),
            ("message", escaped_message.as_str()),
        ],
    );
    (status, render_page(heading, ctx, "", &content)).into_response()
}

fn not_found_page(ctx: Option<&AuthContext>) -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        ctx,
        "Not found",
        "The page you were looking for does not exist.",
    )
}

/// Router fallback.
pub async fn not_found(MaybeAuth(ctx): MaybeAuth) -> Response {
    not_found_page(ctx.as_ref())
}

pub fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => html_escape(v),
        None => r#"<span class="muted">Unknown</span>"#.to_string(),
    }
}

pub fn format_count(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => r#"<span class="muted">Unknown</span>"#.to_string(),
    }
}

pub fn format_funding(value: Option<i64>) -> String {
    match value {
        Some(v) => rivalwatch_signals::rules::funding::format_amount(v),
        None => r#"<span class="muted">Unknown</span>"#.to_string(),
    }
}

pub fn format_time(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Signal table. `names` maps competitor ids to display names.
pub fn signals_table(signals: &[Signal], names: &HashMap<String, String>) -> String {
    if signals.is_empty() {
        return r#"<p class="muted">No signals yet. Signals appear when a competitor's profile changes.</p>"#
            .to_string();
    }

    let mut rows = String::new();
    for signal in signals {
        let competitor = match names.get(&signal.competitor_id) {
            Some(name) => format!(
                r#"<a href="/competitor/{}">{}</a>"#,
                html_escape(&signal.competitor_id),
                html_escape(name)
            ),
            None => r#"<span class="muted">Unknown</span>"#.to_string(),
        };
        let new_badge = if signal.is_new {
            r#" <span class="badge new">new</span>"#
        } else {
            ""
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><span class=\"badge {}\">{}</span></td><td>{}{}</td></tr>",
            format_time(&signal.created_at),
            competitor,
            signal.category.label(),
            signal.severity.as_str(),
            signal.severity.as_str(),
            html_escape(&signal.message),
            new_badge,
        ));
    }
    format!(
        "<table><tr><th>When</th><th>Competitor</th><th>Category</th><th>Severity</th><th>Signal</th></tr>{rows}</table>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_single_pass() {
        let out = fill(
            "<p>{{a}} / {{b}} / {{missing}}</p>",
            &[("a", "{{b}}"), ("b", "two")],
        );
        assert_eq!(out, "<p>{{b}} / two / {{missing}}</p>");
        assert_eq!(fill("tail {{open", &[]), "tail {{open");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#x27;Neil &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn markdown_renders_but_raw_html_does_not() {
        let out = markdown_to_html("**Acme** leads.\n\n<script>alert(1)</script>");
        assert!(out.contains("<strong>Acme</strong>"));
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn funding_uses_compact_amounts() {
        assert_eq!(format_funding(Some(12_500_000)), "$12.5M");
        assert!(format_funding(None).contains("Unknown"));
    }
}
