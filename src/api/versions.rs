//! Version history endpoints.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{test_cases, DbPool};
use crate::entity::version_step;
use crate::error::{AppError, AppResult};

/// One frozen step inside a version snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionStepResponse {
    pub id: i64,
    pub description: String,
    pub expected_result: String,
    pub order: i32,
}

impl From<version_step::Model> for VersionStepResponse {
    fn from(model: version_step::Model) -> Self {
        VersionStepResponse {
            id: model.id,
            description: model.description,
            expected_result: model.expected_result,
            order: model.order,
        }
    }
}

/// One version snapshot of a test case.
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    pub id: i64,
    pub version_number: i32,
    /// Name the test case carried when this version was cut
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub steps: Vec<VersionStepResponse>,
}

/// List a test case's versions, newest first.
#[utoipa::path(
    get,
    path = "/testcases/{id}/versions",
    tag = "Versions",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "Version history", body = [VersionResponse]),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_versions(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let test_case_id = path.into_inner();
    if !test_cases::test_case_exists(pool.connection(), test_case_id).await? {
        return Err(AppError::NotFound(format!("Test case {}", test_case_id)));
    }

    let versions = pool.list_versions(test_case_id).await?;

    let response: Vec<VersionResponse> = versions
        .into_iter()
        .map(|(version, steps)| VersionResponse {
            id: version.id,
            version_number: version.version_number,
            name: version.name,
            created_at: version.created_at,
            steps: steps.into_iter().map(VersionStepResponse::from).collect(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Configure version routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/testcases/{id}/versions").route(web::get().to(list_versions)));
}
