//! API endpoint modules.

use actix_multipart::Multipart;
use futures_util::StreamExt;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub mod attachments;
pub mod comments;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod import;
pub mod openapi;
pub mod templates;
pub mod test_cases;
pub mod test_runs;
pub mod versions;

pub use attachments::configure_routes as configure_attachment_routes;
pub use comments::configure_routes as configure_comment_routes;
pub use dashboard::configure_routes as configure_dashboard_routes;
pub use export::configure_routes as configure_export_routes;
pub use health::configure_health_routes;
pub use import::configure_routes as configure_import_routes;
pub use openapi::ApiDoc;
pub use templates::configure_routes as configure_template_routes;
pub use test_cases::configure_routes as configure_test_case_routes;
pub use test_runs::configure_routes as configure_test_run_routes;
pub use versions::configure_routes as configure_version_routes;

/// Plain confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Confirmation message plus the id of the created row.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

fn multipart_error(e: actix_multipart::MultipartError) -> AppError {
    AppError::InvalidInput(format!("Malformed multipart payload: {}", e))
}

/// Pull the first `file` field out of a multipart payload, bounded by
/// `max_size`. Other fields are drained and ignored. Returns `None` when
/// the payload carries no file field at all.
pub(crate) async fn read_file_field(
    payload: &mut Multipart,
    max_size: usize,
) -> AppResult<Option<(String, Vec<u8>)>> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;

        let (is_file, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name() == Some("file"),
                cd.get_filename().unwrap_or_default().to_string(),
            ),
            None => (false, String::new()),
        };

        if !is_file {
            // Drain so the stream can advance to the next field.
            while let Some(chunk) = field.next().await {
                chunk.map_err(multipart_error)?;
            }
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(multipart_error)?;
            if data.len() + bytes.len() > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "Upload exceeds {} bytes",
                    max_size
                )));
            }
            data.extend_from_slice(&bytes);
        }

        return Ok(Some((filename, data)));
    }

    Ok(None)
}
