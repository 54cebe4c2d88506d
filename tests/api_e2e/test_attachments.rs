//! E2E tests: attachment upload, download and cleanup.

use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_upload_download_delete_round_trip() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let case_id = create_case(&app, case_body("With attachment")).await;

    let content = b"meeting notes about the login flow";
    let body = multipart_file("notes.txt", "text/plain", content);
    let (status, body) = post_multipart(
        &app,
        &format!("/api/testcases/{}/attachments", case_id),
        body,
    )
    .await;
    assert_eq!(status, 201, "Upload should succeed: {:?}", body);
    assert_eq!(body["message"], "File uploaded");
    let attachment_id = body["id"].as_i64().unwrap();

    let (_, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    let attachments = body["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["filename"], "notes.txt");
    assert_eq!(attachments[0]["file_type"], "txt");

    let (status, disposition, data) =
        get_download(&app, &format!("/api/attachments/{}", attachment_id)).await;
    assert_eq!(status, 200);
    assert!(
        disposition.contains("notes.txt"),
        "unexpected disposition: {}",
        disposition
    );
    assert_eq!(data, content);

    let (status, body) = delete_json(&app, &format!("/api/attachments/{}", attachment_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Attachment deleted");

    let (status, _, _) = get_download(&app, &format!("/api/attachments/{}", attachment_id)).await;
    assert_eq!(status, 404);

    let (_, body) = get_json(&app, &format!("/api/testcases/{}", case_id)).await;
    assert_eq!(body["attachments"].as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn test_upload_validations() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    // Unknown test case
    let body = multipart_file("notes.txt", "text/plain", b"x");
    let (status, _) = post_multipart(&app, "/api/testcases/999/attachments", body).await;
    assert_eq!(status, 404);

    let case_id = create_case(&app, case_body("Guarded")).await;
    let uri = format!("/api/testcases/{}/attachments", case_id);

    // Disallowed extension
    let body = multipart_file("payload.exe", "application/octet-stream", b"MZ");
    let (status, body) = post_multipart(&app, &uri, body).await;
    assert_eq!(status, 400, "exe should be rejected: {:?}", body);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("File type not allowed"));

    // No file field
    let body = multipart_plain_field("comment", "just text");
    let (status, body) = post_multipart(&app, &uri, body).await;
    assert_eq!(status, 400, "Missing file field should fail: {:?}", body);

    // Empty filename
    let body = multipart_file("", "text/plain", b"x");
    let (status, _) = post_multipart(&app, &uri, body).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_upload_too_large() {
    let pool = create_test_pool().await;
    let (_dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let case_id = create_case(&app, case_body("Bloated")).await;

    let oversized = vec![0u8; TEST_MAX_UPLOAD_SIZE + 1];
    let body = multipart_file("huge.txt", "text/plain", &oversized);
    let (status, body) = post_multipart(
        &app,
        &format!("/api/testcases/{}/attachments", case_id),
        body,
    )
    .await;
    assert_eq!(status, 413, "Oversized upload should fail: {:?}", body);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
}

#[actix_rt::test]
async fn test_case_delete_removes_attachment_files() {
    let pool = create_test_pool().await;
    let (dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let case_id = create_case(&app, case_body("Hoarder")).await;
    for name in ["a.txt", "b.txt"] {
        let body = multipart_file(name, "text/plain", b"data");
        let (status, _) = post_multipart(
            &app,
            &format!("/api/testcases/{}/attachments", case_id),
            body,
        )
        .await;
        assert_eq!(status, 201);
    }

    let uploads = dir.path().join("uploads");
    let files_before = std::fs::read_dir(&uploads).unwrap().count();
    assert_eq!(files_before, 2);

    let (status, _) = delete_json(&app, &format!("/api/testcases/{}", case_id)).await;
    assert_eq!(status, 200);

    let files_after = std::fs::read_dir(&uploads).unwrap().count();
    assert_eq!(files_after, 0, "case deletion removes stored files");
}

#[actix_rt::test]
async fn test_bulk_delete_removes_attachment_files() {
    let pool = create_test_pool().await;
    let (dir, store) = create_test_store();
    let app = create_test_app(&pool, &store).await;

    let case_id = create_case(&app, case_body("Bulk hoarder")).await;
    let body = multipart_file("c.txt", "text/plain", b"data");
    let (status, _) = post_multipart(
        &app,
        &format!("/api/testcases/{}/attachments", case_id),
        body,
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = post_json(
        &app,
        "/api/testcases/bulk",
        json!({"action": "delete", "test_case_ids": [case_id]}),
    )
    .await;
    assert_eq!(status, 200);

    let uploads = dir.path().join("uploads");
    let files_after = std::fs::read_dir(&uploads).unwrap().count();
    assert_eq!(files_after, 0);
}
