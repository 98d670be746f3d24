//! API integration tests

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use calcsrv::config::CalcsrvConfig;
use common::CorsConfig;
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod support;
use support::{create_router_with, create_test_router, expect_error, get, json_request, raw_request};

fn string_set(value: &Value) -> HashSet<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_router();

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "calcsrv");
}

#[tokio::test]
async fn test_arithmetic_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/arithmetic/evaluate",
        json!({"expression": "2 * (3 + 5)"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["result"], 16.0);
    assert_eq!(body["data"]["expression"], "2 * (3 + 5)");
}

#[tokio::test]
async fn test_arithmetic_errors_by_tier() {
    let app = create_test_router();

    let (status, body) =
        json_request(&app, "POST", "/arithmetic/evaluate", json!({"expression": "   "})).await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_EXPRESSION");

    let (status, body) =
        json_request(&app, "POST", "/arithmetic/evaluate", json!({"expression": "1 / 0"})).await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "DIVISION_BY_ZERO");

    let (status, body) = json_request(
        &app,
        "POST",
        "/arithmetic/evaluate",
        json!({"expression": "__import__('os')"}),
    )
    .await;
    let error = expect_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_EXPRESSION");
    assert!(error["message"].as_str().unwrap().contains("__import__"));
}

#[tokio::test]
async fn test_trigonometry_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/trigonometry/evaluate",
        json!({"function": "tan", "value": 90, "unit": "degrees"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["result"].as_f64().unwrap().abs() > 1e16);
    assert_eq!(body["data"]["function"], "tan");
    assert_eq!(body["data"]["input_value"], 90.0);
    assert_eq!(body["data"]["unit"], "degrees");

    // unit defaults to radians
    let (status, body) = json_request(
        &app,
        "POST",
        "/trigonometry/evaluate",
        json!({"function": "sin", "value": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unit"], "radians");

    let (status, body) = json_request(
        &app,
        "POST",
        "/trigonometry/evaluate",
        json!({"function": "asin", "value": 1.1}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "DOMAIN_ERROR");
}

#[tokio::test]
async fn test_logarithm_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/logarithms/evaluate",
        json!({"function": "log", "value": 1024, "base": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], 10.0);
    assert_eq!(body["data"]["base"], 2.0);

    let (status, body) = json_request(
        &app,
        "POST",
        "/logarithms/evaluate",
        json!({"function": "ln", "value": -10}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "LOG_DOMAIN_ERROR");
}

#[tokio::test]
async fn test_logarithm_base_is_shape_checked() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/logarithms/evaluate",
        json!({"function": "log", "value": 10}),
    )
    .await;
    let error = expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELD");
    assert!(error["field_errors"]["base"].is_array());

    let (status, body) = json_request(
        &app,
        "POST",
        "/logarithms/evaluate",
        json!({"function": "ln", "value": 10, "base": 3}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "FORBIDDEN_FIELD");

    let (status, body) = json_request(
        &app,
        "POST",
        "/logarithms/evaluate",
        json!({"function": "log", "value": 10, "base": 1}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_LOG_BASE");
}

#[tokio::test]
async fn test_polynomial_solve() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/algebra/poly-solve",
        json!({"coefficients": [1, -3, 2]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        string_set(&body["data"]["roots"]),
        HashSet::from(["1.0000".to_string(), "2.0000".to_string()])
    );
    assert_eq!(body["data"]["polynomial"], "x**2 - 3*x + 2");

    let (status, body) = json_request(
        &app,
        "POST",
        "/algebra/poly-solve",
        json!({"coefficients": [1, 0, 4]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        string_set(&body["data"]["roots"]),
        HashSet::from(["0.0000+2.0000j".to_string(), "0.0000-2.0000j".to_string()])
    );
}

#[tokio::test]
async fn test_polynomial_too_few_coefficients() {
    let app = create_test_router();

    let (status, body) =
        json_request(&app, "POST", "/algebra/poly-solve", json!({"coefficients": []})).await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_COLLECTION");

    let (status, body) =
        json_request(&app, "POST", "/algebra/poly-solve", json!({"coefficients": [5]})).await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "INSUFFICIENT_COEFFICIENTS");
}

#[tokio::test]
async fn test_complex_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/complex/evaluate",
        json!({"num1": "3+4j", "num2": "1-2j", "operation": "multiply"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "11-2j");
    assert_eq!(body["data"]["calculation"], "(3+4j) * (1-2j)");

    let (status, body) = json_request(
        &app,
        "POST",
        "/complex/evaluate",
        json!({"num1": "3+4j", "num2": "0", "operation": "divide"}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "COMPLEX_DIVISION_BY_ZERO");

    let (status, body) = json_request(
        &app,
        "POST",
        "/complex/evaluate",
        json!({"num1": "three", "num2": "1", "operation": "add"}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_COMPLEX");
}

#[tokio::test]
async fn test_calculus_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/calculus/evaluate",
        json!({"expression": "x**3 + sin(x)", "operation": "differentiate"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "3*x**2 + cos(x)");
    assert_eq!(body["data"]["input_expression"], "x**3 + sin(x)");
    assert_eq!(body["data"]["operation"], "differentiate");
    assert_eq!(body["data"]["is_definite_integral"], false);

    let (status, body) = json_request(
        &app,
        "POST",
        "/calculus/evaluate",
        json!({"expression": "x**2", "operation": "integrate", "integration_bounds": [0, 3]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "9");
    assert_eq!(body["data"]["is_definite_integral"], true);
}

#[tokio::test]
async fn test_calculus_errors_by_tier() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/calculus/evaluate",
        json!({"expression": "x**2", "operation": "differentiate", "integration_bounds": [0, 1]}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "FORBIDDEN_FIELD");

    let (status, body) = json_request(
        &app,
        "POST",
        "/calculus/evaluate",
        json!({"expression": "y**2", "operation": "integrate"}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_EXPRESSION");
}

#[tokio::test]
async fn test_matrix_evaluate() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({
            "operation": "multiply",
            "matrix1": [[1, 2], [3, 4]],
            "matrix2": [[5, 6], [7, 8]]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], json!([[19.0, 22.0], [43.0, 50.0]]));
    assert_eq!(body["data"]["input_shape1"], "2x2");
    assert_eq!(body["data"]["input_shape2"], "2x2");

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({"operation": "determinant", "matrix1": [[1, 2], [3, 4]]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["data"]["result"].as_f64().unwrap() + 2.0).abs() < 1e-9);
    assert_eq!(body["data"]["input_shape2"], Value::Null);
}

#[tokio::test]
async fn test_matrix_errors_by_tier() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({"operation": "multiply", "matrix1": [[1, 2]]}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELD");

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({"operation": "inverse", "matrix1": [[1, 2], [3]]}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "RAGGED_MATRIX");

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({"operation": "inverse", "matrix1": [[1, 1], [1, 1]]}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "SINGULAR_MATRIX");

    let (status, body) = json_request(
        &app,
        "POST",
        "/matrices/evaluate",
        json!({"operation": "determinant", "matrix1": [[1, 2, 3], [4, 5, 6]]}),
    )
    .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "NOT_SQUARE");
}

#[tokio::test]
async fn test_statistics_evaluate() {
    let app = create_test_router();

    for (operation, expected) in [
        ("mean", 3.0),
        ("median", 3.0),
        ("variance", 2.0),
        ("std_dev", 2.0_f64.sqrt()),
    ] {
        let (status, body) = json_request(
            &app,
            "POST",
            "/statistics/evaluate",
            json!({"operation": operation, "data": [1, 2, 3, 4, 5]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["data"]["result"].as_f64().unwrap() - expected).abs() < 1e-9);
        assert_eq!(body["data"]["operation"], operation);
        assert_eq!(body["data"]["dataset_size"], 5);
    }

    let (status, body) = json_request(
        &app,
        "POST",
        "/statistics/evaluate",
        json!({"operation": "mean", "data": []}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_DATASET");
}

#[tokio::test]
async fn test_number_conversion() {
    let app = create_test_router();

    let (status, body) = json_request(
        &app,
        "POST",
        "/numbers/convert",
        json!({"value": "255", "from_base": 10, "to_base": 16}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], "FF");
    assert_eq!(body["data"]["from_base"], 10);
    assert_eq!(body["data"]["to_base"], 16);
    assert_eq!(body["data"]["original_value"], "255");

    let (status, body) = json_request(
        &app,
        "POST",
        "/numbers/convert",
        json!({"value": "9B", "from_base": 8, "to_base": 10}),
    )
    .await;
    let error = expect_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_NUMERAL");
    assert!(error["message"].as_str().unwrap().contains("9B"));
}

#[tokio::test]
async fn test_body_rejections_use_error_envelope() {
    let app = create_test_router();

    // enum value outside the allowed set
    let (status, body) = json_request(
        &app,
        "POST",
        "/statistics/evaluate",
        json!({"operation": "mode", "data": [1, 2]}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST_BODY");

    // base outside 2, 8, 10, 16
    let (status, body) = json_request(
        &app,
        "POST",
        "/numbers/convert",
        json!({"value": "12", "from_base": 3, "to_base": 10}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST_BODY");

    // missing required field
    let (status, body) = json_request(&app, "POST", "/arithmetic/evaluate", json!({})).await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST_BODY");

    let (status, body) = raw_request(&app, "/arithmetic/evaluate", "{\"expression\": ").await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_content_type() {
    let app = create_test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/arithmetic/evaluate")
        .body(Body::from(r#"{"expression": "1 + 1"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_identical_requests_give_identical_bodies() {
    let app = create_test_router();
    let request = json!({"expression": "exp(-x**2)", "operation": "integrate", "integration_bounds": [0, 1]});

    let (_, first) = json_request(&app, "POST", "/calculus/evaluate", request.clone()).await;
    let (_, second) = json_request(&app, "POST", "/calculus/evaluate", request).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_log_level_admin() {
    let app = create_test_router();

    let (status, body) = get(&app, "/admin/log-level").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["level"].is_string());

    let (status, body) = json_request(
        &app,
        "PUT",
        "/admin/log-level",
        json!({"level": "info,scicalc=loud"}),
    )
    .await;
    expect_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_LOG_LEVEL");

    // The test binary never installs the reloadable subscriber
    let (status, body) = json_request(&app, "PUT", "/admin/log-level", json!({"level": "debug"})).await;
    expect_error(status, &body, StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_cors_headers() {
    let app = create_test_router();
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let config = CalcsrvConfig {
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into()],
        },
        ..CalcsrvConfig::default()
    };
    let app = create_router_with(config);
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
}
