//! Test runs and their per-case executions.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::db::executions::{ExecutionUpdate, StepResult};
use crate::db::test_runs::{NewTestRun, RunExecution};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{StepResponse, TestStatus};

use super::{CreatedResponse, MessageResponse};

/// Run summary with its execution count.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestRunListItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub executions_count: i64,
}

/// Snapshot of the test case an execution tracks, as the runner needs it.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionTestCase {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub category: String,
    pub priority: String,
    pub steps: Vec<StepResponse>,
}

/// One execution row with its embedded test case.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionResponse {
    pub id: i64,
    pub test_case_id: i64,
    pub test_case_name: String,
    pub test_case: ExecutionTestCase,
    pub status: String,
    pub executed_at: DateTime<Utc>,
    pub notes: String,
}

impl From<RunExecution> for ExecutionResponse {
    fn from(run_execution: RunExecution) -> Self {
        let RunExecution {
            execution,
            test_case,
            steps,
        } = run_execution;
        Self {
            id: execution.id,
            test_case_id: execution.test_case_id,
            test_case_name: test_case.name.clone(),
            test_case: ExecutionTestCase {
                id: test_case.id,
                name: test_case.name,
                description: test_case.description,
                precondition: test_case.precondition,
                postcondition: test_case.postcondition,
                category: test_case.category,
                priority: test_case.priority,
                steps: steps.into_iter().map(StepResponse::from).collect(),
            },
            status: execution.status,
            executed_at: execution.executed_at,
            notes: execution.notes,
        }
    }
}

/// Full run detail with every execution.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestRunDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub executions: Vec<ExecutionResponse>,
}

/// Body for creating a run.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestRunRequest {
    /// Name (required)
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Cases to enroll; one execution is created per id
    #[serde(default)]
    pub test_case_ids: Vec<i64>,
}

/// Actual result recorded against one live step during an execution.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExecutionStepRequest {
    pub id: i64,
    /// Absent clears the stored result
    pub actual_result: Option<String>,
}

/// Body for recording an execution outcome.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExecutionRequest {
    pub status: Option<TestStatus>,
    pub notes: Option<String>,
    #[serde(default)]
    pub steps: Vec<ExecutionStepRequest>,
}

/// List test runs, newest first.
#[utoipa::path(
    get,
    path = "/testruns",
    tag = "Test Runs",
    responses(
        (status = 200, description = "All test runs", body = [TestRunListItem]),
    )
)]
pub async fn list_test_runs(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let runs = pool.list_test_runs().await?;
    let response: Vec<TestRunListItem> = runs
        .into_iter()
        .map(|(run, executions_count)| TestRunListItem {
            id: run.id,
            name: run.name,
            description: run.description,
            created_at: run.created_at,
            executions_count,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Create a run and enroll the listed cases.
#[utoipa::path(
    post,
    path = "/testruns",
    tag = "Test Runs",
    request_body = CreateTestRunRequest,
    responses(
        (status = 201, description = "Test run created", body = CreatedResponse),
        (status = 400, description = "Missing name", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown test case id", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_test_run(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestRunRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let Some(name) = req.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::InvalidInput(
            "Test run name is required".to_string(),
        ));
    };

    let run = pool
        .insert_test_run(NewTestRun {
            name,
            description: req.description,
            test_case_ids: req.test_case_ids,
        })
        .await?;

    info!("test run {} created", run.id);

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Test run created".to_string(),
        id: run.id,
    }))
}

/// Get one run with all of its executions.
#[utoipa::path(
    get,
    path = "/testruns/{id}",
    tag = "Test Runs",
    params(
        ("id" = i64, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Run detail", body = TestRunDetail),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_test_run(pool: web::Data<DbPool>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let run = pool
        .get_test_run(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", id)))?;

    let executions = pool.list_run_executions(id).await?;

    let response = TestRunDetail {
        id: run.id,
        name: run.name,
        description: run.description,
        created_at: run.created_at,
        executions: executions.into_iter().map(ExecutionResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Delete a run and its executions.
#[utoipa::path(
    delete,
    path = "/testruns/{id}",
    tag = "Test Runs",
    params(
        ("id" = i64, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Test run deleted", body = MessageResponse),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_test_run(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    pool.delete_test_run(id).await?;

    info!("test run {} deleted", id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test run deleted".to_string(),
    }))
}

/// Record an execution outcome and propagate it to the test case.
#[utoipa::path(
    put,
    path = "/testruns/{run_id}/executions/{execution_id}",
    tag = "Test Runs",
    params(
        ("run_id" = i64, Path, description = "Test run ID"),
        ("execution_id" = i64, Path, description = "Execution ID")
    ),
    request_body = UpdateExecutionRequest,
    responses(
        (status = 200, description = "Execution updated", body = MessageResponse),
        (status = 404, description = "Run or execution not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_execution(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateExecutionRequest>,
) -> AppResult<HttpResponse> {
    let (run_id, execution_id) = path.into_inner();
    let req = body.into_inner();

    let update = ExecutionUpdate {
        status: req.status,
        notes: req.notes,
        steps: req
            .steps
            .into_iter()
            .map(|s| StepResult {
                step_id: s.id,
                actual_result: s.actual_result,
            })
            .collect(),
    };

    pool.update_execution(run_id, execution_id, update).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Execution updated".to_string(),
    }))
}

/// Remove one execution from a run. The test case keeps whatever
/// status the run left on it.
#[utoipa::path(
    delete,
    path = "/testruns/{run_id}/executions/{execution_id}",
    tag = "Test Runs",
    params(
        ("run_id" = i64, Path, description = "Test run ID"),
        ("execution_id" = i64, Path, description = "Execution ID")
    ),
    responses(
        (status = 200, description = "Execution deleted", body = MessageResponse),
        (status = 404, description = "Run or execution not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_execution(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (run_id, execution_id) = path.into_inner();
    pool.delete_execution(run_id, execution_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Execution deleted".to_string(),
    }))
}

/// Configure test run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/testruns")
            .route(web::get().to(list_test_runs))
            .route(web::post().to(create_test_run)),
    )
    .service(
        web::resource("/testruns/{id}")
            .route(web::get().to(get_test_run))
            .route(web::delete().to(delete_test_run)),
    )
    .service(
        web::resource("/testruns/{run_id}/executions/{execution_id}")
            .route(web::put().to(update_execution))
            .route(web::delete().to(delete_execution)),
    );
}
