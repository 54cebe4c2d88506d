//! E2E tests: template outlines and test case comments.

use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_template_lifecycle() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = post_json(
        &app,
        "/api/templates",
        json!({
            "name": "Smoke outline",
            "description": "Baseline checks",
            "category": "Smoke",
            "steps": [
                {"description": "Open the app", "expected_result": "Home screen"},
                {"description": "Log in", "expected_result": "Dashboard loads"}
            ]
        }),
    )
    .await;
    assert_eq!(status, 201, "Create should succeed: {:?}", body);
    assert_eq!(body["message"], "Template created");
    let template_id = body["id"].as_i64().unwrap();

    let (status, body) = get_json(&app, "/api/templates").await;
    assert_eq!(status, 200);
    let templates = body.as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["name"], "Smoke outline");
    assert_eq!(templates[0]["category"], "Smoke");
    let steps = templates[0]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["description"], "Open the app");
    assert_eq!(steps[0]["order"], 0);
    assert_eq!(steps[1]["order"], 1);

    let (status, body) = delete_json(&app, &format!("/api/templates/{}", template_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Template deleted");

    let (_, body) = get_json(&app, "/api/templates").await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn test_template_requires_name() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = post_json(&app, "/api/templates", json!({})).await;
    assert_eq!(status, 400, "Missing name should fail: {:?}", body);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) = post_json(&app, "/api/templates", json!({"name": ""})).await;
    assert_eq!(status, 400, "Empty name should fail");
}

#[actix_rt::test]
async fn test_delete_unknown_template() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = delete_json(&app, "/api/templates/999").await;
    assert_eq!(status, 404, "Unknown template should 404: {:?}", body);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_template_delete_unlinks_cases() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (_, body) = post_json(&app, "/api/templates", json!({"name": "Outline"})).await;
    let template_id = body["id"].as_i64().unwrap();

    let case_id = create_case(
        &app,
        json!({"name": "From outline", "template_id": template_id}),
    )
    .await;

    let (_, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    assert_eq!(body["template_id"], template_id);

    let (status, _) = delete_json(&app, &format!("/api/templates/{}", template_id)).await;
    assert_eq!(status, 200);

    let (status, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    assert_eq!(status, 200, "Case should survive the template: {:?}", body);
    assert_eq!(body["name"], "From outline");
    assert!(
        body["template_id"].is_null(),
        "Link should be cleared: {:?}",
        body["template_id"]
    );
}

#[actix_rt::test]
async fn test_comment_lifecycle() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let case_id = create_case(&app, case_body("Commented case")).await;

    let (status, body) = post_json(
        &app,
        &format!("/api/testcases/{}/comments", case_id),
        json!({"comment": "Fails on Safari"}),
    )
    .await;
    assert_eq!(status, 201, "Add should succeed: {:?}", body);
    assert_eq!(body["message"], "Comment added");
    let first_id = body["id"].as_i64().unwrap();

    let (_, body) = post_json(
        &app,
        &format!("/api/testcases/{}/comments", case_id),
        json!({"comment": "Fixed in build 42"}),
    )
    .await;
    assert!(body["id"].as_i64().unwrap() > first_id);

    let (_, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["comment"], "Fails on Safari", "Oldest first");
    assert_eq!(comments[1]["comment"], "Fixed in build 42");
    assert!(comments[0]["created_at"].is_string());

    let (_, body) = get_json(&app, "/api/testcases").await;
    assert_eq!(body.as_array().unwrap()[0]["comments_count"], 2);

    let (status, body) = delete_json(&app, &format!("/api/comments/{}", first_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Comment deleted");

    let (_, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["comment"], "Fixed in build 42");
}

#[actix_rt::test]
async fn test_comment_on_unknown_case() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = post_json(
        &app,
        "/api/testcases/999/comments",
        json!({"comment": "Into the void"}),
    )
    .await;
    assert_eq!(status, 404, "Unknown case should 404: {:?}", body);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_delete_unknown_comment() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let (status, body) = delete_json(&app, "/api/comments/999").await;
    assert_eq!(status, 404, "Unknown comment should 404: {:?}", body);
    assert_eq!(body["error"], "NOT_FOUND");
}
