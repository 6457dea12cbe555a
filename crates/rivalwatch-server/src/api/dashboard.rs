use crate::api::signals::SignalItem;
use crate::api::{error_response, storage_failure, success_response};
use crate::auth::AuthContext;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use rivalwatch_common::types::{Company, UnreadCounts};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

const RECENT_SIGNALS: u64 = 10;

/// 公司概要
#[derive(Serialize, ToSchema)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
    pub headline: Option<String>,
    #[schema(example = 120)]
    pub employees: Option<i64>,
    /// 融资总额（美元）
    pub funding: Option<i64>,
    pub funding_stage: Option<String>,
    pub industries: Vec<String>,
    /// 最近一次成功富化的时间
    pub enriched_at: Option<DateTime<Utc>>,
}

impl From<Company> for CompanySummary {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
            domain: c.domain,
            headline: c.headline,
            employees: c.number_of_employees,
            funding: c.funding,
            funding_stage: c.funding_stage,
            industries: c.industries,
            enriched_at: c.enriched_at,
        }
    }
}

/// 未读信号数（按分类）
#[derive(Serialize, ToSchema)]
struct UnreadSummary {
    hiring: u64,
    product: u64,
    funding: u64,
    total: u64,
}

impl From<UnreadCounts> for UnreadSummary {
    fn from(c: UnreadCounts) -> Self {
        Self {
            hiring: c.hiring,
            product: c.product,
            funding: c.funding,
            total: c.total(),
        }
    }
}

/// 仪表盘数据
#[derive(Serialize, ToSchema)]
struct DashboardOverview {
    company: CompanySummary,
    /// 公司内活跃用户数
    user_count: u64,
    competitor_count: u64,
    /// 已消耗的富化积分
    credits_used: i64,
    unread: UnreadSummary,
    competitors: Vec<CompanySummary>,
    /// 最近的信号（最多 10 条）
    recent_signals: Vec<SignalItem>,
}

/// 获取当前用户所属公司的仪表盘数据。
/// 鉴权：需要会话 Cookie。
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    tag = "Dashboard",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "仪表盘数据", body = DashboardOverview),
        (status = 401, description = "未登录", body = crate::api::ApiError),
        (status = 404, description = "账号未关联公司", body = crate::api::ApiError)
    )
)]
async fn dashboard_overview(
    Extension(trace_id): Extension<TraceId>,
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(company) = ctx.company else {
        return error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "no_company",
            "No company linked to this account",
        );
    };
    let store = &state.store;

    let user_count = match store.count_company_users(&company.id).await {
        Ok(v) => v,
        Err(e) => return storage_failure(&trace_id, "Failed to count users", e),
    };
    let competitors = match store.list_competitors(&company.id).await {
        Ok(v) => v,
        Err(e) => return storage_failure(&trace_id, "Failed to list competitors", e),
    };
    let credits_used = match store.credits_for_company(&company.id).await {
        Ok(v) => v,
        Err(e) => return storage_failure(&trace_id, "Failed to sum credits", e),
    };
    let unread = match store.count_unread_signals(&company.id).await {
        Ok(v) => v,
        Err(e) => return storage_failure(&trace_id, "Failed to count unread signals", e),
    };
    let recent = match store.list_signals(&company.id, None, RECENT_SIGNALS).await {
        Ok(v) => v,
        Err(e) => return storage_failure(&trace_id, "Failed to list signals", e),
    };

    success_response(
        StatusCode::OK,
        &trace_id,
        DashboardOverview {
            company: company.into(),
            user_count,
            competitor_count: competitors.len() as u64,
            credits_used,
            unread: unread.into(),
            competitors: competitors.into_iter().map(CompanySummary::from).collect(),
            recent_signals: recent.into_iter().map(SignalItem::from).collect(),
        },
    )
}

pub fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(dashboard_overview))
}
