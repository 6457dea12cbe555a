use crate::api::{error_response, storage_failure, success_response};
use crate::auth::AuthContext;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use rivalwatch_common::types::Signal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

/// 竞品信号
#[derive(Serialize, ToSchema)]
pub struct SignalItem {
    pub id: String,
    pub competitor_id: String,
    /// 信号类型（headcount_change / industry_shift / funding_change / ...）
    pub signal_type: String,
    /// 分类（hiring / product / funding）
    pub category: String,
    /// 级别（low / medium / high）
    pub severity: String,
    pub message: String,
    /// 变更明细 `{"key", "old", "new"}`
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// 是否未读
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Signal> for SignalItem {
    fn from(s: Signal) -> Self {
        Self {
            id: s.id,
            competitor_id: s.competitor_id,
            signal_type: s.signal_type,
            category: s.category.as_str().to_string(),
            severity: s.severity.as_str().to_string(),
            message: s.message,
            details: s.details,
            is_new: s.is_new,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct SignalListParams {
    /// 返回条数上限（默认 50，最大 500）
    #[param(required = false)]
    limit: Option<u64>,
}

/// 查询某个竞品的信号列表，按时间倒序。
/// 鉴权：需要会话 Cookie；竞品必须属于当前公司。
#[utoipa::path(
    get,
    path = "/v1/competitors/{id}/signals",
    tag = "Signals",
    security(("session_cookie" = [])),
    params(
        ("id" = String, Path, description = "竞品公司 ID"),
        SignalListParams
    ),
    responses(
        (status = 200, description = "信号列表", body = Vec<SignalItem>),
        (status = 401, description = "未登录", body = crate::api::ApiError),
        (status = 404, description = "竞品不存在", body = crate::api::ApiError)
    )
)]
async fn competitor_signals(
    Extension(trace_id): Extension<TraceId>,
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SignalListParams>,
) -> impl IntoResponse {
    let Some(company) = ctx.company else {
        return error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "no_company",
            "No company linked to this account",
        );
    };

    match state.store.is_competitor(&company.id, &id).await {
        Ok(true) => {}
        Ok(false) => {
            return error_response(
                StatusCode::NOT_FOUND,
                &trace_id,
                "not_found",
                "Competitor not found",
            )
        }
        Err(e) => return storage_failure(&trace_id, "Failed to check competitor link", e),
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    match state
        .store
        .list_competitor_signals(&company.id, &id, limit)
        .await
    {
        Ok(signals) => {
            let items: Vec<SignalItem> = signals.into_iter().map(SignalItem::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Err(e) => storage_failure(&trace_id, "Failed to list competitor signals", e),
    }
}

pub fn signal_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(competitor_signals))
}
