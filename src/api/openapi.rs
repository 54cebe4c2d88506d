//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CaseBench Server",
        version = "0.1.0",
        description = "API server for managing test cases, templates, test runs and executions, with spreadsheet import and DOCX/CSV export"
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Test case endpoints
        api::test_cases::list_test_cases,
        api::test_cases::create_test_case,
        api::test_cases::get_test_case,
        api::test_cases::update_test_case,
        api::test_cases::delete_test_case,
        api::test_cases::bulk_action,
        api::test_cases::list_categories,
        api::test_cases::list_tags,
        api::test_cases::update_step,
        // Comment endpoints
        api::comments::add_comment,
        api::comments::delete_comment,
        // Attachment endpoints
        api::attachments::upload_attachment,
        api::attachments::download_attachment,
        api::attachments::delete_attachment,
        // Version endpoints
        api::versions::list_versions,
        // Template endpoints
        api::templates::list_templates,
        api::templates::create_template,
        api::templates::delete_template,
        // Test run endpoints
        api::test_runs::list_test_runs,
        api::test_runs::create_test_run,
        api::test_runs::get_test_run,
        api::test_runs::delete_test_run,
        api::test_runs::update_execution,
        api::test_runs::delete_execution,
        // Dashboard endpoints
        api::dashboard::get_dashboard,
        // Import and export endpoints
        api::import::import_test_cases,
        api::export::export_test_case,
        api::export::export_bulk,
        api::export::export_csv,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            api::MessageResponse,
            api::CreatedResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Shared models
            models::TestStatus,
            models::Priority,
            models::StepInput,
            models::StepResponse,
            // Test cases
            api::test_cases::TestCaseListItem,
            api::test_cases::TestCaseDetail,
            api::test_cases::RelatedCaseRef,
            api::test_cases::CreateTestCaseRequest,
            api::test_cases::UpdateTestCaseRequest,
            api::test_cases::ListTestCasesQuery,
            api::test_cases::BulkActionRequest,
            api::test_cases::UpdateStepRequest,
            // Comments
            api::comments::CommentResponse,
            api::comments::AddCommentRequest,
            // Attachments
            api::attachments::AttachmentResponse,
            // Versions
            api::versions::VersionResponse,
            api::versions::VersionStepResponse,
            // Templates
            api::templates::TemplateResponse,
            api::templates::TemplateStepResponse,
            api::templates::CreateTemplateRequest,
            // Test runs
            api::test_runs::TestRunListItem,
            api::test_runs::TestRunDetail,
            api::test_runs::ExecutionResponse,
            api::test_runs::ExecutionTestCase,
            api::test_runs::CreateTestRunRequest,
            api::test_runs::UpdateExecutionRequest,
            api::test_runs::ExecutionStepRequest,
            // Dashboard
            api::dashboard::DashboardResponse,
            api::dashboard::RecentExecutionResponse,
            // Export
            api::export::BulkExportRequest,
            api::export::CsvExportQuery,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Test Cases", description = "Test case catalog, bulk actions and live steps"),
        (name = "Comments", description = "Comments on test cases"),
        (name = "Attachments", description = "File attachments on test cases"),
        (name = "Versions", description = "Version history snapshots"),
        (name = "Templates", description = "Reusable test case templates"),
        (name = "Test Runs", description = "Test runs and executions"),
        (name = "Dashboard", description = "Aggregate counts and recent activity"),
        (name = "Import", description = "Spreadsheet import"),
        (name = "Export", description = "DOCX and CSV export")
    )
)]
pub struct ApiDoc;
