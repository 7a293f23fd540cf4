//! Shared harness for API integration tests.
//!
//! Builds the production router (same middleware stack as `main.rs`) over
//! a test database pool and a temporary asset root.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceExt;

use manuals_api::config::ServerConfig;
use manuals_api::router::build_app_router;
use manuals_api::state::AppState;
use manuals_assets::AssetStore;
use manuals_catalog::CatalogManager;

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a test `ServerConfig` with safe defaults and the given upload root.
pub fn test_config(upload_dir: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        upload_dir: upload_dir.to_string(),
    }
}

/// Build the full application router over the given pool and a fresh
/// temporary asset root. The `TempDir` guard must be kept alive for the
/// duration of the test.
pub fn build_test_app(pool: SqlitePool) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().to_str().unwrap().to_string();
    let config = test_config(&upload_dir);

    let assets = AssetStore::new(&config.upload_dir);
    let catalog = Arc::new(CatalogManager::new(pool.clone(), assets));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog,
    };

    (dir, build_app_router(state, &config))
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a multipart/form-data request (POST or PUT) with the given text
/// fields and optional `thumbnail` file part.
pub async fn send_form(
    app: Router,
    method: Method,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    let body = multipart_body(fields, file);
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Assemble a multipart body by hand, the way a browser form submit would.
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"thumbnail\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The standard valid form fields used across tests.
pub fn manual_fields<'a>(order: &'a str, title: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("videoLink", "https://example.com/v1"),
        ("title", title),
        ("description", "D1"),
        ("order", order),
    ]
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn expect_status(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
