//! E2E tests: version snapshots and their triggers.

use serde_json::json;

use casebench_lib::db::test_cases::{NewTestCase, TestCaseUpdate};
use casebench_lib::db::DbPool;
use casebench_lib::migration::Migrator;
use casebench_lib::models::{Priority, TestStatus};
use sea_orm_migration::MigratorTrait;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_cuts_initial_version() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let id = create_case(
        &app,
        json!({
            "name": "Versioned",
            "description": "First draft",
            "steps": [{"description": "Original step", "expected_result": "It works"}]
        }),
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/testcases/{}/versions", id)).await;
    assert_eq!(status, 200);
    let versions = body.as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["version_number"], 1);
    assert_eq!(versions[0]["name"], "Versioned");
    let steps = versions[0]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["description"], "Original step");
}

#[actix_rt::test]
async fn test_version_triggers() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let id = create_case(&app, case_body("Trigger study")).await;
    let uri = format!("/api/testcases/{}", id);
    let versions_uri = format!("/api/testcases/{}/versions", id);

    // Name change cuts a version
    let (status, _) = put_json(&app, &uri, json!({"name": "Renamed"})).await;
    assert_eq!(status, 200);
    let (_, body) = get_json(&app, &versions_uri).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Description change cuts a version
    let (status, _) = put_json(&app, &uri, json!({"description": "Now described"})).await;
    assert_eq!(status, 200);
    let (_, body) = get_json(&app, &versions_uri).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    // A steps array cuts a version even when nothing else changes
    let (status, _) = put_json(&app, &uri, json!({"steps": [{"description": "New step"}]})).await;
    assert_eq!(status, 200);
    let (_, body) = get_json(&app, &versions_uri).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    // Status or priority alone does not
    let (status, _) = put_json(&app, &uri, json!({"status": "Passed", "priority": "High"})).await;
    assert_eq!(status, 200);
    let (_, body) = get_json(&app, &versions_uri).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    // Re-submitting the same name does not
    let (status, _) = put_json(&app, &uri, json!({"name": "Renamed"})).await;
    assert_eq!(status, 200);
    let (_, body) = get_json(&app, &versions_uri).await;
    let versions = body.as_array().unwrap();
    assert_eq!(versions.len(), 4);

    // Newest first
    let numbers: Vec<i64> = versions
        .iter()
        .map(|v| v["version_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![4, 3, 2, 1]);
}

#[actix_rt::test]
async fn test_snapshots_are_frozen() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let id = create_case(
        &app,
        json!({
            "name": "First name",
            "steps": [{"description": "Original step"}]
        }),
    )
    .await;

    let (status, _) = put_json(
        &app,
        &format!("/api/testcases/{}", id),
        json!({"name": "Second name", "steps": [{"description": "Changed step"}]}),
    )
    .await;
    assert_eq!(status, 200);

    let (_, body) = get_json(&app, &format!("/api/testcases/{}/versions", id)).await;
    let versions = body.as_array().unwrap();
    assert_eq!(versions.len(), 2);

    // Version 2 records the state as of the save that cut it
    assert_eq!(versions[0]["version_number"], 2);
    assert_eq!(versions[0]["name"], "Second name");
    assert_eq!(versions[0]["steps"][0]["description"], "Changed step");

    // Version 1 still shows the original state
    assert_eq!(versions[1]["version_number"], 1);
    assert_eq!(versions[1]["name"], "First name");
    assert_eq!(versions[1]["steps"][0]["description"], "Original step");
}

#[actix_rt::test]
async fn test_versions_unknown_case_returns_404() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = get_json(&app, "/api/testcases/999/versions").await;
    assert_eq!(status, 404, "Unknown case should 404: {:?}", body);
}

/// Concurrent edits race for the next version number; the unique index
/// plus the retry loop must hand out distinct numbers.
#[actix_rt::test]
async fn test_concurrent_updates_get_distinct_version_numbers() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("race.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = DbPool::connect_with(&url, 4)
        .await
        .expect("Failed to open file-backed database");
    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");

    let case = pool
        .insert_test_case(NewTestCase {
            name: "Raced".to_string(),
            description: String::new(),
            precondition: String::new(),
            postcondition: String::new(),
            comment: String::new(),
            status: TestStatus::NotRun,
            priority: Priority::Medium,
            category: String::new(),
            tags: String::new(),
            template_id: None,
            related_to: None,
            steps: vec![],
        })
        .await
        .expect("Failed to create test case");

    let left = TestCaseUpdate {
        name: Some("Left".to_string()),
        ..Default::default()
    };
    let right = TestCaseUpdate {
        name: Some("Right".to_string()),
        ..Default::default()
    };

    let (left_result, right_result) = tokio::join!(
        pool.update_test_case(case.id, &left),
        pool.update_test_case(case.id, &right),
    );
    left_result.expect("Left update should succeed");
    right_result.expect("Right update should succeed");

    let versions = pool
        .list_versions(case.id)
        .await
        .expect("Failed to list versions");
    assert_eq!(versions.len(), 3, "Initial version plus one per update");

    let mut numbers: Vec<i32> = versions
        .iter()
        .map(|(version, _)| version.version_number)
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3]);
}
