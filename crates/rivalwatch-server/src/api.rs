pub mod dashboard;
pub mod signals;

use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Error body documented for every JSON endpoint. `err_code` is one of the
/// codes from [`to_custom_error_code`].
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub err_code: i32,
    pub err_msg: String,
    pub trace_id: String,
}

/// Envelope of every JSON response; `data` is absent on errors.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub err_code: i32,
    pub err_msg: String,
    pub trace_id: String,
    pub data: Option<T>,
}

pub fn success_response<T: Serialize>(status: StatusCode, trace_id: &str, data: T) -> Response {
    let body = ApiResponse {
        err_code: 0,
        err_msg: "success".to_string(),
        trace_id: trace_id.to_string(),
        data: Some(data),
    };
    (status, Json(body)).into_response()
}

/// Maps a symbolic error kind to its numeric code: 10xx for client errors,
/// 12xx for account state, 15xx for server faults.
fn to_custom_error_code(kind: &str) -> i32 {
    match kind {
        "bad_request" => 1001,
        "unauthorized" => 1002,
        "not_found" => 1004,
        "no_company" => 1201,
        "internal_error" => 1500,
        "storage_error" => 1501,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, kind: &str, msg: &str) -> Response {
    let body = ApiResponse::<Value> {
        err_code: to_custom_error_code(kind),
        err_msg: msg.to_string(),
        trace_id: trace_id.to_string(),
        data: None,
    };
    (status, Json(body)).into_response()
}

/// Logs a storage failure and answers with the 500 envelope.
pub(crate) fn storage_failure(trace_id: &str, context: &str, err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, trace_id, "{context}");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        trace_id,
        "storage_error",
        "Database error",
    )
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    version: String,
    uptime_secs: i64,
    /// `ok` when the database answers a ping, `error` otherwise.
    storage_status: String,
}

/// 获取服务健康状态。无需登录。
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "服务健康状态", body = HealthResponse)
    )
)]
async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    let storage_status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check storage ping failed");
            "error"
        }
    };
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            storage_status: storage_status.to_string(),
        },
    )
}

pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}

/// Session-protected JSON endpoints.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(dashboard::dashboard_routes())
        .merge(signals::signal_routes())
}
