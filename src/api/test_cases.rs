//! Test case CRUD, catalog filters, bulk actions and live step patches.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::db::test_cases::{NewTestCase, TestCaseFilter, TestCaseUpdate};
use crate::db::{attachments, comments, steps, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{Priority, StepInput, StepResponse, TestStatus};
use crate::services::AttachmentStore;

use super::attachments::AttachmentResponse;
use super::comments::CommentResponse;
use super::{CreatedResponse, MessageResponse};

/// Catalog entry: every scalar field plus steps and child counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestCaseListItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub comment: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub tags: String,
    pub template_id: Option<i64>,
    pub related_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub steps: Vec<StepResponse>,
    pub comments_count: i64,
    pub attachments_count: i64,
}

/// Shallow reference to a case that points here via `related_to`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RelatedCaseRef {
    pub id: i64,
    pub name: String,
}

/// Full detail view with embedded children.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestCaseDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub comment: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub tags: String,
    pub template_id: Option<i64>,
    pub related_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub steps: Vec<StepResponse>,
    pub comments: Vec<CommentResponse>,
    pub attachments: Vec<AttachmentResponse>,
    pub related_cases: Vec<RelatedCaseRef>,
}

/// Body for creating a test case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestCaseRequest {
    /// Name (required)
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub precondition: String,
    #[serde(default)]
    pub postcondition: String,
    #[serde(default)]
    pub comment: String,
    /// Defaults to `Not Run`
    #[serde(default)]
    pub status: TestStatus,
    /// Defaults to `Medium`
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    /// Comma-separated tag list
    #[serde(default)]
    pub tags: String,
    /// Template this case was drafted from; validated, never copied from
    pub template_id: Option<i64>,
    /// Existing case this one relates to
    pub related_to: Option<i64>,
    #[serde(default)]
    pub steps: Vec<StepInput>,
}

/// Body for a partial update. Absent fields keep their stored values;
/// `related_to` distinguishes an absent field from an explicit `null`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTestCaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub precondition: Option<String>,
    pub postcondition: Option<String>,
    pub comment: Option<String>,
    pub status: Option<TestStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub tags: Option<String>,
    /// `null` clears the link, a number re-points it, absent keeps it
    #[serde(default, deserialize_with = "some_if_present")]
    #[schema(value_type = Option<i64>, nullable)]
    pub related_to: Option<Option<i64>>,
    /// Full replacement for the live step list
    pub steps: Option<Vec<StepInput>>,
}

/// Wraps a present value in `Some` so `Option<Option<T>>` can tell an
/// explicit JSON `null` apart from an absent field.
fn some_if_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Catalog filter query parameters.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListTestCasesQuery {
    /// Substring match on name or description
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    /// Substring match on the tags field
    pub tag: Option<String>,
}

/// Body for the bulk endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkActionRequest {
    /// One of `delete`, `update_status`, `update_priority`
    pub action: String,
    #[serde(default)]
    pub test_case_ids: Vec<i64>,
    /// Required for `update_status`
    pub status: Option<TestStatus>,
    /// Required for `update_priority`
    pub priority: Option<Priority>,
}

/// Body for recording an actual result on one live step.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStepRequest {
    /// New observed result; absent keeps the stored value
    pub actual_result: Option<String>,
}

/// List test cases matching the filters, newest first.
#[utoipa::path(
    get,
    path = "/testcases",
    tag = "Test Cases",
    params(
        ("search" = Option<String>, Query, description = "Substring match on name or description"),
        ("status" = Option<String>, Query, description = "Exact status filter"),
        ("priority" = Option<String>, Query, description = "Exact priority filter"),
        ("category" = Option<String>, Query, description = "Exact category filter"),
        ("tag" = Option<String>, Query, description = "Substring match on tags")
    ),
    responses(
        (status = 200, description = "Matching test cases", body = [TestCaseListItem]),
    )
)]
pub async fn list_test_cases(
    pool: web::Data<DbPool>,
    query: web::Query<ListTestCasesQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = TestCaseFilter {
        search: query.search,
        status: query.status,
        priority: query.priority,
        category: query.category,
        tag: query.tag,
    };

    let cases = pool.list_test_cases(&filter).await?;
    let ids: Vec<i64> = cases.iter().map(|c| c.id).collect();

    let mut steps_by_case = std::collections::HashMap::new();
    for step in steps::list_steps_for_cases(pool.connection(), &ids).await? {
        steps_by_case
            .entry(step.test_case_id)
            .or_insert_with(Vec::new)
            .push(step);
    }
    let comment_counts = comments::count_by_test_case(pool.connection(), &ids).await?;
    let attachment_counts = attachments::count_by_test_case(pool.connection(), &ids).await?;

    let response: Vec<TestCaseListItem> = cases
        .into_iter()
        .map(|case| {
            let steps = steps_by_case.remove(&case.id).unwrap_or_default();
            let comments_count = comment_counts.get(&case.id).copied().unwrap_or(0);
            let attachments_count = attachment_counts.get(&case.id).copied().unwrap_or(0);
            TestCaseListItem {
                id: case.id,
                name: case.name,
                description: case.description,
                precondition: case.precondition,
                postcondition: case.postcondition,
                comment: case.comment,
                status: case.status,
                priority: case.priority,
                category: case.category,
                tags: case.tags,
                template_id: case.template_id,
                related_to: case.related_to,
                created_at: case.created_at,
                updated_at: case.updated_at,
                steps: steps.into_iter().map(StepResponse::from).collect(),
                comments_count,
                attachments_count,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Create a test case with its steps and initial version.
#[utoipa::path(
    post,
    path = "/testcases",
    tag = "Test Cases",
    request_body = CreateTestCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = CreatedResponse),
        (status = 400, description = "Missing name or invalid field", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown template or related case", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_test_case(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let Some(name) = req.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::InvalidInput(
            "Test case name is required".to_string(),
        ));
    };

    let case = pool
        .insert_test_case(NewTestCase {
            name,
            description: req.description,
            precondition: req.precondition,
            postcondition: req.postcondition,
            comment: req.comment,
            status: req.status,
            priority: req.priority,
            category: req.category,
            tags: req.tags,
            template_id: req.template_id,
            related_to: req.related_to,
            steps: req.steps,
        })
        .await?;

    info!("test case {} created", case.id);

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Test Case Created".to_string(),
        id: case.id,
    }))
}

/// Get one test case with steps, comments, attachments and related cases.
#[utoipa::path(
    get,
    path = "/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "Test case detail", body = TestCaseDetail),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let case = pool
        .get_test_case(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

    let steps = steps::list_steps(pool.connection(), id).await?;
    let comments = comments::list_comments(pool.connection(), id).await?;
    let attachments = attachments::list_attachments(pool.connection(), id).await?;
    let related_cases = pool.list_related_cases(id).await?;

    let response = TestCaseDetail {
        id: case.id,
        name: case.name,
        description: case.description,
        precondition: case.precondition,
        postcondition: case.postcondition,
        comment: case.comment,
        status: case.status,
        priority: case.priority,
        category: case.category,
        tags: case.tags,
        template_id: case.template_id,
        related_to: case.related_to,
        created_at: case.created_at,
        updated_at: case.updated_at,
        steps: steps.into_iter().map(StepResponse::from).collect(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
        attachments: attachments
            .into_iter()
            .map(AttachmentResponse::from)
            .collect(),
        related_cases: related_cases
            .into_iter()
            .map(|c| RelatedCaseRef {
                id: c.id,
                name: c.name,
            })
            .collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Apply a partial update, cutting a version snapshot when the name,
/// description or steps change.
#[utoipa::path(
    put,
    path = "/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    request_body = UpdateTestCaseRequest,
    responses(
        (status = 200, description = "Test case updated", body = MessageResponse),
        (status = 400, description = "Invalid field", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<UpdateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    let update = TestCaseUpdate {
        name: req.name,
        description: req.description,
        precondition: req.precondition,
        postcondition: req.postcondition,
        comment: req.comment,
        status: req.status,
        priority: req.priority,
        category: req.category,
        tags: req.tags,
        related_to: req.related_to,
        steps: req.steps,
    };

    pool.update_test_case(id, &update).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test Case Updated".to_string(),
    }))
}

/// Delete a test case, its children and its attachment files.
#[utoipa::path(
    delete,
    path = "/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "Test case deleted", body = MessageResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_test_case(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let stored_names = pool.delete_test_case(id).await?;
    remove_attachment_files(&store, &stored_names).await;

    info!("test case {} deleted", id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test Case Deleted".to_string(),
    }))
}

/// Run one action over many test cases.
#[utoipa::path(
    post,
    path = "/testcases/bulk",
    tag = "Test Cases",
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Action applied", body = MessageResponse),
        (status = 400, description = "Unknown action or missing parameter", body = crate::error::ErrorResponse),
    )
)]
pub async fn bulk_action(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    body: web::Json<BulkActionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let requested = req.test_case_ids.len();

    let message = match req.action.as_str() {
        "delete" => {
            let stored_names = pool.bulk_delete_test_cases(&req.test_case_ids).await?;
            remove_attachment_files(&store, &stored_names).await;
            format!("{} test cases deleted", requested)
        }
        "update_status" => {
            let Some(status) = req.status else {
                return Err(AppError::InvalidInput(
                    "A status is required for update_status".to_string(),
                ));
            };
            pool.bulk_update_status(&req.test_case_ids, status).await?;
            format!("Status updated for {} test cases", requested)
        }
        "update_priority" => {
            let Some(priority) = req.priority else {
                return Err(AppError::InvalidInput(
                    "A priority is required for update_priority".to_string(),
                ));
            };
            pool.bulk_update_priority(&req.test_case_ids, priority)
                .await?;
            format!("Priority updated for {} test cases", requested)
        }
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unknown bulk action: {}",
                other
            )));
        }
    };

    Ok(HttpResponse::Ok().json(MessageResponse { message }))
}

/// List distinct categories in use.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Test Cases",
    responses(
        (status = 200, description = "Sorted category names", body = [String]),
    )
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let categories = pool.distinct_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// List distinct tags in use.
#[utoipa::path(
    get,
    path = "/tags",
    tag = "Test Cases",
    responses(
        (status = 200, description = "Sorted tag names", body = [String]),
    )
)]
pub async fn list_tags(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let tags = pool.distinct_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}

/// Record the actual result on one live step.
#[utoipa::path(
    put,
    path = "/steps/{id}",
    tag = "Test Cases",
    params(
        ("id" = i64, Path, description = "Step ID")
    ),
    request_body = UpdateStepRequest,
    responses(
        (status = 200, description = "Step updated", body = MessageResponse),
        (status = 404, description = "Step not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_step(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<UpdateStepRequest>,
) -> AppResult<HttpResponse> {
    pool.update_step_actual_result(path.into_inner(), body.into_inner().actual_result)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Step updated".to_string(),
    }))
}

/// Best-effort cleanup of attachment files once their rows are gone.
async fn remove_attachment_files(store: &AttachmentStore, stored_names: &[String]) {
    for stored_name in stored_names {
        if let Err(e) = store.remove(stored_name).await {
            warn!("failed to remove attachment file {}: {}", stored_name, e);
        }
    }
}

/// Configure test case routes. The bulk route registers ahead of the id
/// route so `bulk` never parses as an id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/testcases")
            .route(web::get().to(list_test_cases))
            .route(web::post().to(create_test_case)),
    )
    .service(web::resource("/testcases/bulk").route(web::post().to(bulk_action)))
    .service(
        web::resource("/testcases/{id}")
            .route(web::get().to(get_test_case))
            .route(web::put().to(update_test_case))
            .route(web::delete().to(delete_test_case)),
    )
    .service(web::resource("/steps/{id}").route(web::put().to(update_step)))
    .service(web::resource("/categories").route(web::get().to(list_categories)))
    .service(web::resource("/tags").route(web::get().to(list_tags)));
}
