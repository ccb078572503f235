//! /api/queries: history listing and deletion, scoped to the verified caller.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_list_requires_bearer() {
    let app = app();
    let (status, body) = send(&app.router, request("GET", "/api/queries", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Authorization header required"));

    let (status, body) = send(&app.router, request("GET", "/api/queries", Some("expired"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn test_list_returns_only_callers_rows_newest_first() {
    let app = app();
    app.store.seed_query("q-1", USER_ID, "first");
    app.store.seed_query("q-2", "someone-else", "not mine");
    app.store.seed_query("q-3", USER_ID, "second");

    let (status, body) = send(&app.router, request("GET", "/api/queries", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["queries"][0]["query_text"], json!("second"));
    assert_eq!(body["queries"][1]["query_text"], json!("first"));
}

#[tokio::test]
async fn test_list_store_failure_is_500() {
    let app = app_with(FakeBackend::default(), FakeStore::failing(), Duration::from_secs(5));
    let (status, body) = send(&app.router, request("GET", "/api/queries", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to fetch query history"));
}

#[tokio::test]
async fn test_delete_needs_an_id() {
    let app = app();
    let (status, body) = send(&app.router, request("DELETE", "/api/queries", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Query ID required"));

    let (status, _) = send(&app.router, request("DELETE", "/api/queries?id=a%2Cb", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_scoped_to_owner() {
    let app = app();
    app.store.seed_query("q-1", "someone-else", "not mine");
    app.store.seed_query("q-2", USER_ID, "mine");

    let (status, body) = send(&app.router, request("DELETE", "/api/queries?id=q-1", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(app.store.rows().len(), 2);

    let (status, body) = send(&app.router, request("DELETE", "/api/queries?id=q-2", Some(GOOD_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Query deleted successfully"));
    assert_eq!(app.store.rows().len(), 1);
}

#[tokio::test]
async fn test_delete_without_auth_touches_nothing() {
    let app = app();
    app.store.seed_query("q-1", USER_ID, "mine");
    let (status, _) = send(&app.router, request("DELETE", "/api/queries?id=q-1", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.rows().len(), 1);
}
