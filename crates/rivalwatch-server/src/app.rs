use crate::state::AppState;
use crate::{api, auth, logging, openapi, pages};
use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rivalwatch API",
        description = "rivalwatch 竞品情报 JSON API",
    ),
    tags(
        (name = "Health", description = "服务健康检查"),
        (name = "Dashboard", description = "仪表盘概览"),
        (name = "Signals", description = "竞品信号")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            utoipa::openapi::security::SecurityScheme::ApiKey(
                utoipa::openapi::security::ApiKey::Cookie(
                    utoipa::openapi::security::ApiKeyValue::new(auth::SESSION_COOKIE),
                ),
            ),
        );
    }
}

/// 空列表允许任意来源（不携带凭证）；否则只允许列出的来源并携带 Cookie
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn build_http_app(state: AppState) -> Router {
    let (public_router, public_spec) = api::public_routes().split_for_parts();
    let (api_router, api_spec) = api::api_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(public_spec);
    merged_spec.merge(api_spec);
    let spec = Arc::new(merged_spec);

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(pages::public_routes())
        .merge(
            pages::protected_routes()
                .layer(middleware::from_fn(auth::require_page_session)),
        )
        .merge(public_router)
        .merge(
            api_router
                .layer(middleware::from_fn(auth::require_api_session))
                .layer(cors),
        )
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        .with_state(state)
        .merge(openapi::json_route(spec))
        .layer(middleware::from_fn(logging::request_logging))
}
