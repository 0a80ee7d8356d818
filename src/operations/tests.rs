//! Tests for the operations module

use super::*;
use crate::error::Error;
use crate::executor::ItemOperation;
use crate::http::ApiClient;
use crate::mapping::MapperConfig;
use crate::source::Record;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// DeleteUser Tests
// ============================================================================

#[tokio::test]
async fn test_delete_user_success_on_204() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/environments/env-1/users/u-42"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let op = DeleteUser::new(
        ApiClient::new().unwrap(),
        format!("{}/v1/environments/env-1/", mock_server.uri()),
    );
    let user = json!({"id": "u-42", "username": "alice"});

    assert_eq!(op.identify(&user), "u-42");
    op.apply(&user, "tok").await.unwrap();
}

#[tokio::test]
async fn test_delete_user_remote_error_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(403).set_body_string("{\"code\":\"ACCESS_FAILED\"}"))
        .mount(&mock_server)
        .await;

    let op = DeleteUser::new(ApiClient::new().unwrap(), mock_server.uri());
    let err = op.apply(&json!({"id": "u1"}), "tok").await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("ACCESS_FAILED"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_delete_user_other_success_code_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let op = DeleteUser::new(ApiClient::new().unwrap(), mock_server.uri());
    let err = op.apply(&json!({"id": "u1"}), "tok").await.unwrap_err();
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_delete_user_without_id_is_rejected_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let op = DeleteUser::new(ApiClient::new().unwrap(), mock_server.uri());
    let user = json!({"username": "ghost"});

    assert_eq!(op.identify(&user), "[no id]");
    assert!(matches!(
        op.apply(&user, "tok").await,
        Err(Error::Decode { .. })
    ));
}

// ============================================================================
// ImportUser Tests
// ============================================================================

fn alice() -> Record {
    Record::from_pairs(
        2,
        [
            ("username", "alice"),
            ("name.given", "Alice"),
            ("enabled", "true"),
            ("population", ""),
            ("password", "Pa55word!"),
        ],
    )
}

#[tokio::test]
async fn test_import_user_posts_mapped_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", IMPORT_CONTENT_TYPE))
        .and(body_json(json!({
            "username": "alice",
            "name": {"given": "Alice"},
            "enabled": true,
            "population": {"id": "pop-1"},
            "password": {"value": "Pa55word!", "forceChange": true}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let op = ImportUser::new(
        ApiClient::new().unwrap(),
        &mock_server.uri(),
        MapperConfig::new("pop-1", true),
    );

    assert_eq!(op.identify(&alice()), "alice");
    op.apply(&alice(), "tok").await.unwrap();
}

#[tokio::test]
async fn test_import_user_conflict_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("uniqueness violation"))
        .mount(&mock_server)
        .await;

    let op = ImportUser::new(
        ApiClient::new().unwrap(),
        &mock_server.uri(),
        MapperConfig::new("pop-1", false),
    );

    let err = op.apply(&alice(), "tok").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(!err.is_fatal());
}

#[test]
fn test_import_identify_falls_back_to_line() {
    let op = ImportUser::new(
        ApiClient::new().unwrap(),
        "http://localhost",
        MapperConfig::new("pop-1", false),
    );
    let record = Record::from_pairs(17, [("email", "x@y.io")]);
    assert_eq!(op.identify(&record), "[unknown] line 17");
}
