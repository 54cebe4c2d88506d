//! E2E tests: dashboard aggregates and health endpoints.

use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_dashboard_empty_catalog() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = get_json(&app, "/api/dashboard").await;
    assert_eq!(status, 200, "Dashboard should load: {:?}", body);
    assert_eq!(body["total_cases"], 0);

    let status_counts = body["status_counts"].as_object().unwrap();
    assert_eq!(status_counts.len(), 5, "All statuses even when zero");
    for key in ["Not Run", "Passed", "Failed", "Blocked", "Skipped"] {
        assert_eq!(status_counts[key], 0, "{} should be zero", key);
    }

    let priority_counts = body["priority_counts"].as_object().unwrap();
    assert_eq!(priority_counts.len(), 4, "All priorities even when zero");
    for key in ["Critical", "High", "Medium", "Low"] {
        assert_eq!(priority_counts[key], 0, "{} should be zero", key);
    }

    assert_eq!(body["recent_executions"].as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn test_dashboard_counts_and_recent_executions() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    for name in ["Login works", "Logout works"] {
        create_case(
            &app,
            json!({"name": name, "status": "Passed", "priority": "High"}),
        )
        .await;
    }
    let failing = create_case(
        &app,
        json!({"name": "Checkout fails", "status": "Failed", "priority": "Low"}),
    )
    .await;
    create_case(&app, case_body("Untouched")).await;

    let (_, body) = post_json(
        &app,
        "/api/testruns",
        json!({"name": "Nightly", "test_case_ids": [failing]}),
    )
    .await;
    let run_id = body["id"].as_i64().unwrap();

    let (_, body) = get_json(&app, &format!("/api/testruns/{}", run_id)).await;
    let execution_id = body["executions"][0]["id"].as_i64().unwrap();

    let (status, body) = put_json(
        &app,
        &format!("/api/testruns/{}/executions/{}", run_id, execution_id),
        json!({"status": "Failed", "notes": "Still broken"}),
    )
    .await;
    assert_eq!(status, 200, "Execution update should succeed: {:?}", body);

    let (status, body) = get_json(&app, "/api/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["total_cases"], 4);

    let status_counts = &body["status_counts"];
    assert_eq!(status_counts["Passed"], 2);
    assert_eq!(status_counts["Failed"], 1);
    assert_eq!(status_counts["Not Run"], 1);
    assert_eq!(status_counts["Blocked"], 0);
    assert_eq!(status_counts["Skipped"], 0);

    let priority_counts = &body["priority_counts"];
    assert_eq!(priority_counts["High"], 2);
    assert_eq!(priority_counts["Low"], 1);
    assert_eq!(priority_counts["Medium"], 1);
    assert_eq!(priority_counts["Critical"], 0);

    let recent = body["recent_executions"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["id"], execution_id);
    assert_eq!(recent[0]["test_case_id"], failing);
    assert_eq!(recent[0]["test_case_name"], "Checkout fails");
    assert_eq!(recent[0]["status"], "Failed");
    assert!(recent[0]["executed_at"].is_string());
}

#[actix_rt::test]
async fn test_dashboard_recent_puts_latest_result_first() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let first = create_case(&app, case_body("First")).await;
    let second = create_case(&app, case_body("Second")).await;

    let (_, body) = post_json(
        &app,
        "/api/testruns",
        json!({"name": "Pair run", "test_case_ids": [first, second]}),
    )
    .await;
    let run_id = body["id"].as_i64().unwrap();

    let (_, body) = get_json(&app, &format!("/api/testruns/{}", run_id)).await;
    let executions = body["executions"].as_array().unwrap();
    let first_exec = executions
        .iter()
        .find(|e| e["test_case_id"] == first)
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, _) = put_json(
        &app,
        &format!("/api/testruns/{}/executions/{}", run_id, first_exec),
        json!({"status": "Passed"}),
    )
    .await;
    assert_eq!(status, 200);

    let (_, body) = get_json(&app, "/api/dashboard").await;
    let recent = body["recent_executions"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(
        recent[0]["test_case_name"], "First",
        "Re-stamped execution should lead: {:?}",
        recent
    );
    assert_eq!(recent[0]["status"], "Passed");
    assert_eq!(recent[1]["status"], "Not Run");
}

#[actix_rt::test]
async fn test_health_endpoints() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = get_json(&app, "/api/ready").await;
    assert_eq!(status, 200, "Ready should pass with a live pool: {:?}", body);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");
}
