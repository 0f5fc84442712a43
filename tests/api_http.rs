//! HTTP-level tests driven through the router in-process with tower's
//! `oneshot`, covering the response envelope and status-code mapping.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use dealroom_rs::api::{create_router, AppState};
use dealroom_rs::store::JsonFileStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("data")).await.unwrap();
    let state = AppState {
        store: Arc::new(store),
        uploads_dir: dir.path().join("uploads"),
    };
    (dir, create_router().with_state(state))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    send(
        app,
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn put_json(app: &Router, uri: &str, body: Value) -> Response {
    send(
        app,
        Request::put(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_responds() {
    let (_dir, app) = test_app().await;
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (_dir, app) = test_app().await;
    let response = get(&app, "/api/projects/p1/no-such-thing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deal_room_is_created_on_first_get() {
    let (_dir, app) = test_app().await;
    let response = get(&app, "/api/projects/p1/deal-room").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["projectId"], "p1");
    assert_eq!(json["data"]["investmentBlurb"], "");
    assert!(json["data"]["keyInfo"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_blurb_is_rejected_with_400() {
    let (_dir, app) = test_app().await;
    let response = put_json(
        &app,
        "/api/projects/p1/deal-room",
        json!({ "investmentBlurb": "x".repeat(501) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Validation failed"));
}

#[tokio::test]
async fn draft_save_and_publish_flow() {
    let (_dir, app) = test_app().await;

    let response = post_json(
        &app,
        "/api/projects/p1/deal-room/draft",
        json!({
            "sessionId": "s1",
            "draftData": { "investmentBlurb": "hello" },
            "isAutoSave": true
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 1);

    let response = post_json(
        &app,
        "/api/projects/p1/deal-room/draft/publish",
        json!({ "sessionId": "s1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 1);
    assert_eq!(json["data"]["dealRoom"]["investmentBlurb"], "hello");

    let json = body_json(get(&app, "/api/projects/p1/deal-room").await).await;
    assert_eq!(json["data"]["investmentBlurb"], "hello");
}

#[tokio::test]
async fn publish_without_draft_is_404() {
    let (_dir, app) = test_app().await;
    let response = post_json(
        &app,
        "/api/projects/p1/deal-room/draft/publish",
        json!({ "sessionId": "s1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "No draft found to publish");
}

#[tokio::test]
async fn conflicting_publish_returns_409_and_resolves() {
    let (_dir, app) = test_app().await;

    // Session A publishes version 1.
    post_json(
        &app,
        "/api/projects/p1/deal-room/draft",
        json!({ "sessionId": "a", "draftData": { "investmentBlurb": "A" } }),
    )
    .await;
    post_json(
        &app,
        "/api/projects/p1/deal-room/draft/publish",
        json!({ "sessionId": "a" }),
    )
    .await;

    // Session B starts editing on top of version 1.
    post_json(
        &app,
        "/api/projects/p1/deal-room/draft",
        json!({
            "sessionId": "b",
            "draftData": { "investmentSummary": "B" },
            "lastSavedVersion": 1
        }),
    )
    .await;

    // Session A publishes version 2 underneath B.
    post_json(
        &app,
        "/api/projects/p1/deal-room/draft",
        json!({ "sessionId": "a", "draftData": { "investmentBlurb": "A2" } }),
    )
    .await;
    post_json(
        &app,
        "/api/projects/p1/deal-room/draft/publish",
        json!({ "sessionId": "a" }),
    )
    .await;

    let response = post_json(
        &app,
        "/api/projects/p1/deal-room/draft/publish",
        json!({ "sessionId": "b" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Conflict detected"));
    let conflict_id = json["error"]["conflictId"].as_str().unwrap().to_string();

    // Canonical document kept A's latest publish.
    let json = body_json(get(&app, "/api/projects/p1/deal-room").await).await;
    assert_eq!(json["data"]["investmentBlurb"], "A2");
    assert_eq!(json["data"]["investmentSummary"], "");

    // Merge resolution keeps both sides.
    let response = post_json(
        &app,
        &format!("/api/projects/p1/deal-room/conflicts/{conflict_id}/resolve"),
        json!({ "strategy": "merge" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["dealRoom"]["investmentBlurb"], "A2");
    assert_eq!(json["data"]["dealRoom"]["investmentSummary"], "B");

    let json = body_json(
        get(&app, "/api/projects/p1/deal-room/conflicts?sessionId=b").await,
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn save_status_and_recovery_report_unpublished_content() {
    let (_dir, app) = test_app().await;

    let json = body_json(
        get(&app, "/api/projects/p1/deal-room/save-status?sessionId=s1").await,
    )
    .await;
    assert_eq!(json["data"]["hasDraft"], false);
    assert_eq!(json["data"]["hasUnsavedChanges"], false);

    post_json(
        &app,
        "/api/projects/p1/deal-room/draft",
        json!({ "sessionId": "s1", "draftData": { "investmentBlurb": "wip" }, "isAutoSave": true }),
    )
    .await;

    let json = body_json(
        get(&app, "/api/projects/p1/deal-room/save-status?sessionId=s1").await,
    )
    .await;
    assert_eq!(json["data"]["hasDraft"], true);
    assert_eq!(json["data"]["hasUnsavedChanges"], true);
    assert_eq!(json["data"]["isAutoSave"], true);

    let json = body_json(
        get(&app, "/api/projects/p1/deal-room/recover-changes?sessionId=s1").await,
    )
    .await;
    assert_eq!(json["data"]["draftData"]["investmentBlurb"], "wip");

    // Nothing to recover for a session that never saved.
    let json = body_json(
        get(&app, "/api/projects/p1/deal-room/recover-changes?sessionId=other").await,
    )
    .await;
    assert_eq!(json["success"], true);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn versions_endpoint_lists_and_restores() {
    let (_dir, app) = test_app().await;

    for text in ["one", "two"] {
        post_json(
            &app,
            "/api/projects/p1/deal-room/draft",
            json!({ "sessionId": "s1", "draftData": { "investmentBlurb": text } }),
        )
        .await;
        post_json(
            &app,
            "/api/projects/p1/deal-room/draft/publish",
            json!({ "sessionId": "s1" }),
        )
        .await;
    }

    let json = body_json(get(&app, "/api/projects/p1/deal-room/versions").await).await;
    let versions = json["data"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["version"], 2);

    let response = post_json(
        &app,
        "/api/projects/p1/deal-room/versions/1/restore",
        json!({ "sessionId": "s1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 3);
    assert_eq!(json["data"]["dealRoom"]["investmentBlurb"], "one");
}

#[tokio::test]
async fn showcase_photo_upload_get_delete() {
    let (_dir, app) = test_app().await;
    let bytes: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; \
             filename=\"pic.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = send(
        &app,
        Request::post("/api/projects/p1/deal-room/showcase-photo")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["originalName"], "pic.png");
    assert_eq!(json["data"]["mimeType"], "image/png");
    assert_eq!(json["data"]["size"], bytes.len());

    let response = get(&app, "/api/projects/p1/deal-room/showcase-photo").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], bytes);

    let response = send(
        &app,
        Request::delete("/api/projects/p1/deal-room/showcase-photo")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/projects/p1/deal-room/showcase-photo").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cleanup_endpoint_reports_removed_count() {
    let (_dir, app) = test_app().await;
    let response = post_json(&app, "/api/maintenance/cleanup-drafts", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["removed"], 0);
}
