//! E2E tests: spreadsheet import and DOCX/CSV export.

use serde_json::json;

use super::test_helpers::*;

const CSV_IMPORT: &str = r#"name,description,precondition,postcondition,status,priority,category,tags,steps
Login works,Check login,Have account,,Passed,High,Auth,"smoke,auth","[{""description"":""Open page"",""expected_result"":""Form shows""}]"
Weird row,,,,Bogus,Nope,,,
"#;

#[actix_rt::test]
async fn test_import_csv() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let body = multipart_file("cases.csv", "text/csv", CSV_IMPORT.as_bytes());
    let (status, body) = post_multipart(&app, "/api/import", body).await;
    assert_eq!(status, 201, "Import should succeed: {:?}", body);
    assert_eq!(body["message"], "2 test cases imported");

    let (_, body) = get_json(&app, "/api/testcases").await;
    let cases = body.as_array().unwrap();
    assert_eq!(cases.len(), 2);

    let login = cases
        .iter()
        .find(|c| c["name"] == "Login works")
        .expect("imported case present");
    assert_eq!(login["status"], "Passed");
    assert_eq!(login["priority"], "High");
    assert_eq!(login["tags"], "smoke,auth");
    let steps = login["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["description"], "Open page");
    assert_eq!(steps[0]["expected_result"], "Form shows");

    // Unknown enum text falls back to the defaults
    let weird = cases
        .iter()
        .find(|c| c["name"] == "Weird row")
        .expect("fallback case present");
    assert_eq!(weird["status"], "Not Run");
    assert_eq!(weird["priority"], "Medium");

    // Imported cases start without version history
    let id = login["id"].as_i64().unwrap();
    let (status, body) = get_json(&app, &format!("/api/testcases/{}/versions", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn test_import_rejects_bad_payloads() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    // No file field at all
    let body = multipart_plain_field("data", "not a file");
    let (status, body) = post_multipart(&app, "/api/import", body).await;
    assert_eq!(status, 400, "Missing file should fail: {:?}", body);

    // A file field with an empty filename
    let body = multipart_file("", "text/csv", b"name\nX\n");
    let (status, _) = post_multipart(&app, "/api/import", body).await;
    assert_eq!(status, 400, "Empty filename should fail");

    // Unsupported extension
    let body = multipart_file("cases.pdf", "application/pdf", b"%PDF-1.4");
    let (status, body) = post_multipart(&app, "/api/import", body).await;
    assert_eq!(status, 400, "Unsupported format should fail: {:?}", body);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_export_single_docx() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let id = create_case(
        &app,
        json!({
            "name": "Exported",
            "description": "Goes to Word",
            "steps": [{"description": "Do the thing", "expected_result": "Thing done"}]
        }),
    )
    .await;

    let (status, disposition, data) = get_download(&app, &format!("/api/export/{}", id)).await;
    assert_eq!(status, 200);
    assert!(
        disposition.contains(&format!("TestCase_{}.docx", id)),
        "unexpected disposition: {}",
        disposition
    );
    assert!(data.starts_with(b"PK"), "docx is a zip container");

    let (status, _, _) = get_download(&app, "/api/export/999").await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_export_bulk_docx() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let a = create_case(&app, case_body("One")).await;
    let b = create_case(&app, case_body("Two")).await;

    let (status, disposition, data) = post_download(
        &app,
        "/api/export/bulk",
        json!({"test_case_ids": [a, b, 999]}),
    )
    .await;
    assert_eq!(status, 200, "Bulk export skips unknown ids");
    assert!(
        disposition.contains("Bulk_Export_"),
        "unexpected disposition: {}",
        disposition
    );
    assert!(disposition.contains(".docx"));
    assert!(data.starts_with(b"PK"));
}

#[actix_rt::test]
async fn test_export_csv() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let a = create_case(
        &app,
        json!({
            "name": "In the export",
            "category": "Reports",
            "steps": [{"description": "Check totals"}]
        }),
    )
    .await;
    let _b = create_case(&app, case_body("Also exported")).await;

    let (status, disposition, data) = get_download(&app, "/api/export/csv").await;
    assert_eq!(status, 200);
    assert!(
        disposition.contains("TestCases_Export.csv"),
        "unexpected disposition: {}",
        disposition
    );

    let text = String::from_utf8(data).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "name,description,precondition,postcondition,status,priority,category,tags,steps"
    );
    assert!(text.contains("In the export"));
    assert!(text.contains("Also exported"));
    assert!(text.contains("Check totals"));

    // Restricting to explicit ids
    let (status, _, data) = get_download(&app, &format!("/api/export/csv?ids={}", a)).await;
    assert_eq!(status, 200);
    let text = String::from_utf8(data).unwrap();
    assert!(text.contains("In the export"));
    assert!(!text.contains("Also exported"));

    // Malformed id lists are rejected
    let (status, _, _) = get_download(&app, "/api/export/csv?ids=1,zzz").await;
    assert_eq!(status, 400);
}
