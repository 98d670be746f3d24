//! Shared helpers for calcsrv integration tests

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use calcsrv::{config::CalcsrvConfig, routes::create_routes, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub fn create_test_router() -> Router {
    create_router_with(CalcsrvConfig::default())
}

pub fn create_router_with(config: CalcsrvConfig) -> Router {
    create_routes(Arc::new(AppState::new(config)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}

/// Send a JSON body and decode the JSON response
pub async fn json_request(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a raw body with a JSON content type
pub async fn raw_request(app: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Assert a failure envelope and return its `error` object
pub fn expect_error(status: StatusCode, body: &Value, expected: StatusCode, error_code: &str) -> Value {
    assert_eq!(status, expected, "body: {}", body);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], expected.as_u16());
    assert_eq!(body["error"]["error_code"], error_code, "body: {}", body);
    body["error"].clone()
}
