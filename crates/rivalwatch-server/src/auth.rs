use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rivalwatch_common::types::{Company, User};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::api::error_response;
use crate::config::AuthConfig;
use crate::logging::TraceId;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "rivalwatch_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

pub fn create_token(
    secret: &str,
    user_id: &str,
    email: &str,
    expire_secs: u64,
) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + expire_secs,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// The signed-in user and their company, resolved once per request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// `None` when the user's company was deleted.
    pub company: Option<Company>,
}

/// Optional session extractor for routes that serve guests too.
pub struct MaybeAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthContext>().cloned()))
    }
}

/// Builds the session cookie carrying a signed token.
pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

/// Signs a session for `user` and stores it in the jar.
pub fn sign_in(state: &AppState, jar: CookieJar, user: &User) -> anyhow::Result<CookieJar> {
    let token = create_token(
        &state.jwt_secret,
        &user.id,
        &user.email,
        state.config.auth.session_ttl_secs,
    )?;
    Ok(jar.add(session_cookie(token, &state.config.auth)))
}

pub fn sign_out(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

async fn resolve_session(state: &AppState, token: &str) -> Option<AuthContext> {
    let claims = match validate_token(&state.jwt_secret, token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            return None;
        }
    };

    let user = match state.store.get_user(&claims.sub).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => return None,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session user");
            return None;
        }
    };

    let company = match user.company_id.as_deref() {
        Some(id) => match state.store.get_company(id).await {
            Ok(company) => company,
            Err(e) => {
                tracing::error!(error = %e, company_id = %id, "Failed to load session company");
                None
            }
        },
        None => None,
    };

    Some(AuthContext { user, company })
}

/// Resolves the session cookie (if any) into an [`AuthContext`] extension.
/// Never rejects; guards below decide what anonymous requests may see.
pub async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(ctx) = resolve_session(&state, cookie.value()).await {
            req.extensions_mut().insert(ctx);
        }
    }
    next.run(req).await
}

/// Only local absolute paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// 页面路由守卫：未登录时跳转到 `/login?next=<path>`
pub async fn require_page_session(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthContext>().is_some() {
        return next.run(req).await;
    }
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::to(&format!("/login?next={}", urlencoding::encode(target))).into_response()
}

/// JSON API 守卫：未登录时返回 401 统一错误包
pub async fn require_api_session(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthContext>().is_some() {
        return next.run(req).await;
    }
    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_default();
    error_response(
        StatusCode::UNAUTHORIZED,
        &trace_id,
        "unauthorized",
        "missing or invalid session",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = create_token("secret", "42", "ada@acme.com", 3600).unwrap();
        let claims = validate_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ada@acme.com");
        assert!(validate_token("other-secret", &token).is_err());
    }

    #[test]
    fn next_parameter_round_trips_through_the_query() {
        let encoded = urlencoding::encode("/signals?category=hiring");
        assert_eq!(encoded, "%2Fsignals%3Fcategory%3Dhiring");
        let decoded = urlencoding::decode(&encoded).unwrap();
        assert_eq!(safe_next(Some(decoded.as_ref())), "/signals?category=hiring");
    }

    #[test]
    fn only_local_redirects_are_followed() {
        assert_eq!(safe_next(Some("/company")), "/company");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
