//! Spreadsheet import of test cases.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::config::Config;
use crate::db::test_cases::NewTestCase;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::spreadsheet;

use super::{read_file_field, MessageResponse};

/// Import test cases from an uploaded XLSX, XLS or CSV file.
///
/// Imported cases get no version history and no template or relation
/// links; they enter the catalog as plain new rows.
#[utoipa::path(
    post,
    path = "/import",
    tag = "Import",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Cases imported", body = MessageResponse),
        (status = 400, description = "Missing file or unsupported format", body = crate::error::ErrorResponse),
    )
)]
pub async fn import_test_cases(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let Some((filename, data)) = read_file_field(&mut payload, config.max_upload_size).await?
    else {
        return Err(AppError::InvalidInput(
            "No file part in the request".to_string(),
        ));
    };
    if filename.is_empty() {
        return Err(AppError::InvalidInput("No file selected".to_string()));
    }

    let imported = spreadsheet::parse_import(&data, &filename)?;
    let new_cases: Vec<NewTestCase> = imported
        .into_iter()
        .map(|case| NewTestCase {
            name: case.name,
            description: case.description,
            precondition: case.precondition,
            postcondition: case.postcondition,
            comment: String::new(),
            status: case.status,
            priority: case.priority,
            category: case.category,
            tags: case.tags,
            template_id: None,
            related_to: None,
            steps: case.steps,
        })
        .collect();

    let count = pool.import_test_cases(new_cases).await?;
    info!("imported {} test cases from {}", count, filename);

    Ok(HttpResponse::Created().json(MessageResponse {
        message: format!("{} test cases imported", count),
    }))
}

/// Configure the import route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/import").route(web::post().to(import_test_cases)));
}
