//! Aggregate counts and recent activity for the dashboard.

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::AppResult;

/// Recent execution with the name of the case it ran.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentExecutionResponse {
    pub id: i64,
    pub test_case_id: i64,
    pub test_case_name: String,
    pub status: String,
    pub executed_at: DateTime<Utc>,
}

/// Dashboard payload. Every status and priority appears in the count
/// maps, zero or not, so charts keep a stable shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_cases: u64,
    pub status_counts: BTreeMap<String, u64>,
    pub priority_counts: BTreeMap<String, u64>,
    pub recent_executions: Vec<RecentExecutionResponse>,
}

/// Get catalog totals, per-status and per-priority counts and the ten
/// most recent executions.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardResponse),
    )
)]
pub async fn get_dashboard(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let counts = pool.dashboard_counts().await?;

    let response = DashboardResponse {
        total_cases: counts.total_cases,
        status_counts: counts
            .status_counts
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect(),
        priority_counts: counts
            .priority_counts
            .into_iter()
            .map(|(priority, count)| (priority.as_str().to_string(), count))
            .collect(),
        recent_executions: counts
            .recent_executions
            .into_iter()
            .map(|recent| RecentExecutionResponse {
                id: recent.execution.id,
                test_case_id: recent.execution.test_case_id,
                test_case_name: recent.test_case_name,
                status: recent.execution.status,
                executed_at: recent.execution.executed_at,
            })
            .collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configure the dashboard route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/dashboard").route(web::get().to(get_dashboard)));
}
