//! Attachment endpoints: multipart upload, download and delete.

use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::db::attachments::NewAttachment;
use crate::db::{test_cases, DbPool};
use crate::entity::attachment;
use crate::error::{AppError, AppResult};
use crate::services::AttachmentStore;

use super::{read_file_field, CreatedResponse, MessageResponse};

/// One stored attachment of a test case.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: i64,
    /// Original filename as uploaded
    pub filename: String,
    /// Lowercased file extension
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(model: attachment::Model) -> Self {
        AttachmentResponse {
            id: model.id,
            filename: model.filename,
            file_type: model.file_type,
            created_at: model.created_at,
        }
    }
}

/// Upload a file for a test case.
///
/// Expects a multipart body with a `file` field. Extension and size limits
/// apply; the original filename is kept on the record while the disk copy
/// gets a unique name.
#[utoipa::path(
    post,
    path = "/testcases/{id}/attachments",
    tag = "Attachments",
    params(
        ("id" = i64, Path, description = "Test case ID")
    ),
    responses(
        (status = 201, description = "File uploaded", body = CreatedResponse),
        (status = 400, description = "Missing or disallowed file", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_attachment(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let test_case_id = path.into_inner();
    if !test_cases::test_case_exists(pool.connection(), test_case_id).await? {
        return Err(AppError::NotFound(format!("Test case {}", test_case_id)));
    }

    let Some((filename, data)) = read_file_field(&mut payload, config.max_upload_size).await?
    else {
        return Err(AppError::InvalidInput(
            "No file part in the request".to_string(),
        ));
    };
    if filename.is_empty() {
        return Err(AppError::InvalidInput("No file selected".to_string()));
    }
    if !AttachmentStore::allowed_filename(&filename) {
        return Err(AppError::InvalidInput(format!(
            "File type not allowed: {}",
            filename
        )));
    }

    let sanitized = AttachmentStore::sanitize_filename(&filename);
    if sanitized.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unusable filename: {}",
            filename
        )));
    }

    let stored_name = AttachmentStore::disk_name(&sanitized);
    store.save(&stored_name, &data).await?;

    // Extension is known to exist after the allowed_filename check.
    let file_type = AttachmentStore::extension(&filename).unwrap_or_default();

    let record = pool
        .insert_attachment(NewAttachment {
            test_case_id,
            filename,
            stored_name,
            file_type,
        })
        .await?;

    info!(
        "attachment {} stored for test case {} ({} bytes)",
        record.id,
        test_case_id,
        data.len()
    );

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "File uploaded".to_string(),
        id: record.id,
    }))
}

/// Download an attachment.
#[utoipa::path(
    get,
    path = "/attachments/{id}",
    tag = "Attachments",
    params(
        ("id" = i64, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File contents", body = Vec<u8>),
        (status = 404, description = "Attachment not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn download_attachment(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let record = pool
        .get_attachment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attachment {}", id)))?;

    let Some(data) = store.read(&record.stored_name).await? else {
        warn!("attachment {} is missing on disk", record.id);
        return Err(AppError::NotFound(format!("Attachment {}", id)));
    };

    Ok(HttpResponse::Ok()
        .content_type(AttachmentStore::content_type_for_extension(
            &record.file_type,
        ))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(record.filename)],
        })
        .body(data))
}

/// Delete an attachment and its file.
#[utoipa::path(
    delete,
    path = "/attachments/{id}",
    tag = "Attachments",
    params(
        ("id" = i64, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Attachment deleted", body = MessageResponse),
        (status = 404, description = "Attachment not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_attachment(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let record = pool.delete_attachment(path.into_inner()).await?;

    if let Err(e) = store.remove(&record.stored_name).await {
        // The record is gone; an orphaned file only wastes space.
        warn!("failed to remove attachment file {}: {}", record.stored_name, e);
    }

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Attachment deleted".to_string(),
    }))
}

/// Configure attachment routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/testcases/{id}/attachments").route(web::post().to(upload_attachment)),
    )
    .service(
        web::resource("/attachments/{id}")
            .route(web::get().to(download_attachment))
            .route(web::delete().to(delete_attachment)),
    );
}
