//! Comment endpoints for test cases.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entity::test_case_comment;
use crate::error::AppResult;

use super::{CreatedResponse, MessageResponse};

/// One comment on a test case.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<test_case_comment::Model> for CommentResponse {
    fn from(model: test_case_comment::Model) -> Self {
        CommentResponse {
            id: model.id,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}

/// Body for adding a comment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    /// Comment text; defaults to empty
    #[serde(default)]
    pub comment: String,
}

/// Add a comment to a test case.
#[utoipa::path(
    post,
    path = "/testcases/{id}/comments",
    tag = "Comments",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CreatedResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_comment(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<AddCommentRequest>,
) -> AppResult<HttpResponse> {
    let test_case_id = path.into_inner();
    let comment = pool
        .insert_comment(test_case_id, body.into_inner().comment)
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Comment added".to_string(),
        id: comment.id,
    }))
}

/// Delete a comment.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "Comments",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 404, description = "Comment not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_comment(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    pool.delete_comment(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Comment deleted".to_string(),
    }))
}

/// Configure comment routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/testcases/{id}/comments").route(web::post().to(add_comment)))
        .service(web::resource("/comments/{id}").route(web::delete().to(delete_comment)));
}
