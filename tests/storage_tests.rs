//! HTTP blob store tests against a mocked object-storage endpoint.

use accounts::storage::{BlobStore, HttpBlobStore};
use accounts::types::AppError;
use axum::body::Bytes;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_put_upload_returns_public_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/bucket/Users/abc"))
        .and(header("content-type", "image/png"))
        .and(header("authorization", "Bearer storage-token"))
        .and(body_bytes(b"png-bytes".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpBlobStore::new(
        &format!("{}/bucket", mock_server.uri()),
        "https://cdn.example.com/",
        Some("storage-token".to_string()),
    )
    .unwrap();

    let url = store
        .store(Bytes::from_static(b"png-bytes"), "Users/abc", Some("image/png"))
        .await
        .unwrap();

    assert_eq!(url, "https://cdn.example.com/Users/abc");
}

#[tokio::test]
async fn test_default_content_type_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/Users/raw"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpBlobStore::new(&mock_server.uri(), "https://cdn.example.com", None).unwrap();

    let url = store
        .store(Bytes::from_static(b"raw"), "Users/raw", None)
        .await
        .unwrap();

    assert_eq!(url, "https://cdn.example.com/Users/raw");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_rejected_upload_is_storage_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AccessDenied"))
        .mount(&mock_server)
        .await;

    let store = HttpBlobStore::new(&mock_server.uri(), "https://cdn.example.com", None).unwrap();

    let result = store
        .store(Bytes::from_static(b"x"), "Users/denied", None)
        .await;

    match result {
        Err(AppError::Storage(message)) => {
            assert!(message.contains("403"));
            assert!(message.contains("AccessDenied"));
        }
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_path_never_reaches_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = HttpBlobStore::new(&mock_server.uri(), "https://cdn.example.com", None).unwrap();

    let result = store
        .store(Bytes::from_static(b"x"), "Users/../../etc", None)
        .await;

    assert!(matches!(result, Err(AppError::Storage(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_storage_error() {
    // Port 9 (discard) is not listening in test environments
    let store = HttpBlobStore::new("http://127.0.0.1:9", "https://cdn.example.com", None).unwrap();

    let result = store
        .store(Bytes::from_static(b"x"), "Users/offline", None)
        .await;

    assert!(matches!(result, Err(AppError::Storage(_))));
}
