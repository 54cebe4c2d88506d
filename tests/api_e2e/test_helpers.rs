//! Shared helpers for the API test suite.

use actix_web::dev::ServiceResponse;
use actix_web::{test, web, App};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::path::PathBuf;

use casebench_lib::api;
use casebench_lib::config::{Config, Environment};
use casebench_lib::db::DbPool;
use casebench_lib::error::AppError;
use casebench_lib::migration::Migrator;
use casebench_lib::services::AttachmentStore;

/// Upload cap used by the test app.
pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

pub const MULTIPART_BOUNDARY: &str = "----casebench-test-boundary";

/// Fresh in-memory database with the full schema applied.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Attachment store rooted in a fresh temp directory. Keep the TempDir
/// alive for the duration of the test.
pub fn create_test_store() -> (tempfile::TempDir, AttachmentStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store =
        AttachmentStore::new(dir.path().join("uploads")).expect("Failed to create test store");
    (dir, store)
}

fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        data_dir: PathBuf::from("data"),
        static_dir: None,
        max_upload_size: TEST_MAX_UPLOAD_SIZE,
    }
}

/// Create a test app with every API route mounted under /api.
pub async fn create_test_app(
    pool: &DbPool,
    store: &AttachmentStore,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(test_config()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(err.to_string()).into()
            }))
            .service(
                web::scope("/api")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_test_case_routes)
                    .configure(api::configure_comment_routes)
                    .configure(api::configure_attachment_routes)
                    .configure(api::configure_version_routes)
                    .configure(api::configure_template_routes)
                    .configure(api::configure_test_run_routes)
                    .configure(api::configure_dashboard_routes)
                    .configure(api::configure_import_routes)
                    .configure(api::configure_export_routes),
            ),
    )
    .await
}

pub async fn get_json<S>(app: &S, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

pub async fn post_json<S>(app: &S, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

pub async fn put_json<S>(app: &S, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::put().uri(uri).set_json(body).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

pub async fn delete_json<S>(app: &S, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::delete().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Fetch a download endpoint, returning status, Content-Disposition and body.
pub async fn get_download<S>(app: &S, uri: &str) -> (u16, String, Vec<u8>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = test::read_body(resp).await.to_vec();
    (status, disposition, body)
}

/// POST a JSON body to a download endpoint, returning status,
/// Content-Disposition and body.
pub async fn post_download<S>(app: &S, uri: &str, body: Value) -> (u16, String, Vec<u8>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = test::read_body(resp).await.to_vec();
    (status, disposition, body)
}

/// Build a multipart body with one file field.
pub fn multipart_file(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Build a multipart body with one plain (non-file) field.
pub fn multipart_plain_field(name: &str, value: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart<S>(app: &S, uri: &str, body: Vec<u8>) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Create a test case and return its id.
pub async fn create_case<S>(app: &S, body: Value) -> i64
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = post_json(app, "/api/testcases", body).await;
    assert_eq!(status, 201, "Create should succeed: {:?}", body);
    body["id"].as_i64().expect("create response carries an id")
}

/// Minimal create body with just a name.
pub fn case_body(name: &str) -> Value {
    serde_json::json!({ "name": name })
}
