use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use rivalwatch_common::types::NewUser;
use rivalwatch_enrich::domain::clean_domain;
use rivalwatch_storage::StorageError;
use serde::Deserialize;

use crate::auth::{safe_next, sign_in, sign_out, MaybeAuth};
use crate::pages::{error_flash, fill, html_escape, render_page, PageResult};
use crate::services::{insights, onboarding};
use crate::state::AppState;

const LOGIN: &str = include_str!("templates/login.html");
const SIGNUP: &str = include_str!("templates/signup.html");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub company_name: String,
    pub company_domain: String,
}

impl SignupForm {
    fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            role: self.role.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            company_domain: self.company_domain.trim().to_lowercase(),
        }
    }

    /// Required-field checks, in form order.
    fn missing_fields(&self) -> Vec<String> {
        let mut errors: Vec<String> = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
            ("Company name", &self.company_name),
            ("Company domain", &self.company_domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| format!("{label} is required."))
        .collect();
        if !self.company_domain.is_empty() && clean_domain(&self.company_domain).is_empty() {
            errors.push(INVALID_DOMAIN.to_string());
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

const INVALID_DOMAIN: &str = "Company domain must look like example.com.";
const DUPLICATE_EMAIL: &str = "An account with that email already exists. Please log in instead.";

fn signup_page(form: &SignupForm, errors: &[String], status: StatusCode) -> Response {
    let first_name = html_escape(&form.first_name);
    let last_name = html_escape(&form.last_name);
    let email = html_escape(&form.email);
    let role = html_escape(&form.role);
    let company_name = html_escape(&form.company_name);
    let company_domain = html_escape(&form.company_domain);
    let content = fill(
        SIGNUP,
        &[
            ("first_name", first_name.as_str()),
            ("last_name", last_name.as_str()),
            ("email", email.as_str()),
            ("role", role.as_str()),
            ("company_name", company_name.as_str()),
            ("company_domain", company_domain.as_str()),
        ],
    );
    (status, render_page("Sign up", None, &error_flash(errors), &content)).into_response()
}

fn login_page(email: &str, next: &str, errors: &[String], status: StatusCode) -> Response {
    let email = html_escape(email);
    let next = html_escape(next);
    let content = fill(
        LOGIN,
        &[("email", email.as_str()), ("next", next.as_str())],
    );
    (status, render_page("Log in", None, &error_flash(errors), &content)).into_response()
}

async fn signup_form(MaybeAuth(ctx): MaybeAuth) -> Response {
    if ctx.is_some() {
        return Redirect::to("/").into_response();
    }
    signup_page(&SignupForm::default(), &[], StatusCode::OK)
}

/// Creates the user, onboarding their company on the way. Enrichment and
/// AI failures never fail the signup; only storage errors do.
async fn signup_submit(
    State(state): State<AppState>,
    MaybeAuth(ctx): MaybeAuth,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> PageResult {
    if ctx.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = form.normalized();
    let mut errors = form.missing_fields();
    if !form.email.is_empty() && state.store.get_user_by_email(&form.email).await?.is_some() {
        errors.push(DUPLICATE_EMAIL.to_string());
    }
    if !errors.is_empty() {
        return Ok(signup_page(&form, &errors, StatusCode::BAD_REQUEST));
    }

    let report =
        onboarding::onboard_company(&state, &form.company_name, &form.company_domain).await?;

    let new_user = NewUser {
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        role: Some(form.role.clone()).filter(|r| !r.is_empty()),
        company_id: Some(report.company.id.clone()),
    };
    let user = match state.store.create_user(new_user).await {
        Ok(user) => user,
        Err(StorageError::Invalid { reason, .. }) => {
            tracing::warn!(reason = %reason, "Signup rejected by storage");
            return Ok(signup_page(
                &form,
                &[DUPLICATE_EMAIL.to_string()],
                StatusCode::BAD_REQUEST,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = insights::ensure_landscape(&state, &report.company).await {
        tracing::warn!(error = %e, company = %report.company.name, "Could not prepare landscape at signup");
    }

    tracing::info!(
        user_id = %user.id,
        company = %report.company.name,
        is_new = report.is_new,
        enriched = report.enriched,
        competitors = report.competitors_added,
        credits = report.credits,
        "User signed up"
    );

    let jar = sign_in(&state, jar, &user)?;
    Ok((jar, Redirect::to("/")).into_response())
}

async fn login_form(MaybeAuth(ctx): MaybeAuth, Query(query): Query<NextQuery>) -> Response {
    if ctx.is_some() {
        return Redirect::to("/").into_response();
    }
    login_page("", query.next.as_deref().unwrap_or(""), &[], StatusCode::OK)
}

/// Email-only login.
async fn login_submit(
    State(state): State<AppState>,
    MaybeAuth(ctx): MaybeAuth,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> PageResult {
    if ctx.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = form.email.trim().to_lowercase();
    let fail = |msg: &str| login_page(&email, &form.next, &[msg.to_string()], StatusCode::BAD_REQUEST);
    if email.is_empty() {
        return Ok(fail("Email is required to log in."));
    }

    let user = match state.store.get_user_by_email(&email).await? {
        Some(user) => user,
        None => return Ok(fail("We couldn't find an account with that email. Please sign up first.")),
    };
    if !user.is_active {
        return Ok(fail("This account is disabled. Contact your administrator."));
    }

    tracing::info!(user_id = %user.id, "User logged in");
    let jar = sign_in(&state, jar, &user)?;
    let target = safe_next(Some(&form.next)).to_string();
    Ok((jar, Redirect::to(&target)).into_response())
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (sign_out(jar), Redirect::to("/login"))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup_submit))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_reported_in_order() {
        let form = SignupForm {
            email: "  ADA@Acme.com ".into(),
            company_domain: " Acme.COM ".into(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(form.email, "ada@acme.com");
        assert_eq!(form.company_domain, "acme.com");
        assert_eq!(
            form.missing_fields(),
            vec![
                "First name is required.",
                "Last name is required.",
                "Company name is required.",
            ]
        );
    }

    #[test]
    fn domain_must_survive_cleaning() {
        let mut form = SignupForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@acme.com".into(),
            company_name: "Acme".into(),
            ..Default::default()
        };
        assert_eq!(form.missing_fields(), vec!["Company domain is required."]);

        form.company_domain = "https://".into();
        assert_eq!(form.missing_fields(), vec![INVALID_DOMAIN]);

        form.company_domain = "https://www.acme.com/about".into();
        assert!(form.missing_fields().is_empty());
    }
}
