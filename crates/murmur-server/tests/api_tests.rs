//! Integration tests for the chat HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use murmur_hub::Hub;
use murmur_server::router::build_router;
use murmur_server::state::AppState;
use murmur_store::{MemoryStore, MessageStore};
use murmur_types::Submission;
use serde_json::Value;
use tower::ServiceExt;

fn make_state() -> Arc<AppState> {
    let store = Arc::new(MessageStore::from(MemoryStore::new()));
    Arc::new(AppState::new(Hub::with_store(100, store)).unwrap())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_renders_history() {
    let state = make_state();
    state
        .hub
        .post(Submission::new("alice", "<b>hello</b>"))
        .await
        .unwrap();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("alice"));
    assert!(html.contains("&lt;b&gt;hello"));
    assert!(!html.contains("<b>hello</b>"));
}

#[tokio::test]
async fn test_post_and_list_messages() {
    let state = make_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/messages",
            &serde_json::json!({ "username": "alice", "message": " hi " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_to_json(response.into_body()).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["username"], "alice");
    assert_eq!(created["message"], "hi");
    assert!(created["timestamp"].is_i64());

    let response = router
        .oneshot(Request::get("/api/messages").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["messages"][0]["message"], "hi");

    assert_eq!(state.hub.history().await.len(), 1);
}

#[tokio::test]
async fn test_post_blank_message_is_rejected() {
    let state = make_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/messages",
            &serde_json::json!({ "username": "alice", "message": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 422);
    assert!(state.hub.history().await.is_empty());
}

#[tokio::test]
async fn test_post_defaults_username() {
    let router = build_router(make_state());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/messages",
            &serde_json::json!({ "message": "who am i" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["username"], murmur_types::DEFAULT_USERNAME);
}

#[tokio::test]
async fn test_edit_message() {
    let state = make_state();
    state
        .hub
        .post(Submission::new("alice", "teh"))
        .await
        .unwrap();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/messages/1",
            &serde_json::json!({ "message": "the" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "the");
    assert!(json["edited_at"].is_i64());
    assert_eq!(state.hub.history().await[0].text, "the");

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/messages/42",
            &serde_json::json!({ "message": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(json_request(
            "PATCH",
            "/api/messages/1",
            &serde_json::json!({ "message": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_form_post_redirects() {
    let state = make_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(
            Request::post("/send")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=&message=from+the+form"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let history = state.hub.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "from the form");
    assert_eq!(history[0].username, murmur_types::DEFAULT_USERNAME);

    // Blank form posts still redirect but store nothing.
    let response = router
        .oneshot(
            Request::post("/send")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=bob&message=+"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.hub.history().await.len(), 1);
}

#[tokio::test]
async fn test_health() {
    let router = build_router(make_state());

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["connections"], 0);
    assert_eq!(json["history"], 0);
}

#[tokio::test]
async fn test_list_without_store_uses_history() {
    let state = Arc::new(AppState::new(Hub::new(100)).unwrap());
    state
        .hub
        .post(Submission::new("alice", "ephemeral"))
        .await
        .unwrap();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/messages").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert!(json["messages"][0].get("id").is_none());
}
