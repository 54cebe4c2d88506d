//! DOCX and CSV downloads of test cases.

use std::collections::HashMap;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::db::test_cases::TestCaseFilter;
use crate::db::{steps, DbPool};
use crate::entity::{step, test_case};
use crate::error::{AppError, AppResult};
use crate::services::{docx, spreadsheet};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Body for the bulk DOCX export.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkExportRequest {
    #[serde(default)]
    pub test_case_ids: Vec<i64>,
}

/// Query for the CSV export.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CsvExportQuery {
    /// Comma-separated test case ids; absent exports the whole catalog
    pub ids: Option<String>,
}

fn download(filename: String, content_type: &str, data: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .content_type(content_type)
        .body(data)
}

/// Fetch the listed cases with their steps, keeping request order and
/// skipping ids that no longer exist.
async fn collect_cases(
    pool: &DbPool,
    ids: &[i64],
) -> AppResult<Vec<(test_case::Model, Vec<step::Model>)>> {
    let mut cases = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(case) = pool.get_test_case(id).await? else {
            debug!("skipping unknown test case {} in export", id);
            continue;
        };
        let steps = steps::list_steps(pool.connection(), id).await?;
        cases.push((case, steps));
    }
    Ok(cases)
}

fn parse_ids(raw: &str) -> AppResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid test case id: {}", s)))
        })
        .collect()
}

/// Download one test case as a DOCX document.
#[utoipa::path(
    get,
    path = "/export/{test_case_id}",
    tag = "Export",
    params(
        ("test_case_id" = i64, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "DOCX document"),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn export_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let case = pool
        .get_test_case(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;
    let steps = steps::list_steps(pool.connection(), id).await?;

    let document = docx::test_case_document(&case, &steps)?;
    info!("exported test case {} as docx", id);

    Ok(download(
        format!("TestCase_{}.docx", id),
        DOCX_CONTENT_TYPE,
        document,
    ))
}

/// Download several test cases as one DOCX document, one page per case.
#[utoipa::path(
    post,
    path = "/export/bulk",
    tag = "Export",
    request_body = BulkExportRequest,
    responses(
        (status = 200, description = "DOCX document"),
    )
)]
pub async fn export_bulk(
    pool: web::Data<DbPool>,
    body: web::Json<BulkExportRequest>,
) -> AppResult<HttpResponse> {
    let ids = body.into_inner().test_case_ids;
    let cases = collect_cases(&pool, &ids).await?;

    let document = docx::bulk_document(&cases)?;
    info!("exported {} test cases as docx", cases.len());

    let filename = format!("Bulk_Export_{}.docx", Utc::now().format("%Y%m%d_%H%M%S"));
    Ok(download(filename, DOCX_CONTENT_TYPE, document))
}

/// Download test cases as CSV, either the listed ids or the whole catalog.
#[utoipa::path(
    get,
    path = "/export/csv",
    tag = "Export",
    params(
        ("ids" = Option<String>, Query, description = "Comma-separated test case ids")
    ),
    responses(
        (status = 200, description = "CSV document"),
        (status = 400, description = "Malformed id list", body = crate::error::ErrorResponse),
    )
)]
pub async fn export_csv(
    pool: web::Data<DbPool>,
    query: web::Query<CsvExportQuery>,
) -> AppResult<HttpResponse> {
    let cases = match query.into_inner().ids {
        Some(raw) => collect_cases(&pool, &parse_ids(&raw)?).await?,
        None => {
            let all = pool.list_test_cases(&TestCaseFilter::default()).await?;
            let ids: Vec<i64> = all.iter().map(|c| c.id).collect();
            let mut steps_by_case = HashMap::new();
            for step in steps::list_steps_for_cases(pool.connection(), &ids).await? {
                steps_by_case
                    .entry(step.test_case_id)
                    .or_insert_with(Vec::new)
                    .push(step);
            }
            all.into_iter()
                .map(|case| {
                    let steps = steps_by_case.remove(&case.id).unwrap_or_default();
                    (case, steps)
                })
                .collect()
        }
    };

    let data = spreadsheet::export_csv(&cases)?;
    info!("exported {} test cases as csv", cases.len());

    Ok(download("TestCases_Export.csv".to_string(), "text/csv", data))
}

/// Configure export routes. The fixed `csv` and `bulk` segments register
/// ahead of the id route so they never parse as ids.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/export/csv").route(web::get().to(export_csv)))
        .service(web::resource("/export/bulk").route(web::post().to(export_bulk)))
        .service(web::resource("/export/{test_case_id}").route(web::get().to(export_test_case)));
}
