//! API Route Configuration
//!
//! Central route definition for all calculator endpoints

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use common::CorsConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

#[cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::api::admin_handlers::{get_log_level, set_log_level};
use crate::api::calculation_handlers::{
    convert_number, evaluate_arithmetic, evaluate_calculus, evaluate_complex, evaluate_logarithm,
    evaluate_matrix, evaluate_statistics, evaluate_trigonometry, solve_polynomial,
};
use crate::api::health_handlers::health_check;
use crate::AppState;

#[cfg(feature = "openapi")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::calculation_handlers::evaluate_arithmetic,
        crate::api::calculation_handlers::evaluate_trigonometry,
        crate::api::calculation_handlers::evaluate_logarithm,
        crate::api::calculation_handlers::solve_polynomial,
        crate::api::calculation_handlers::evaluate_complex,
        crate::api::calculation_handlers::evaluate_calculus,
        crate::api::calculation_handlers::evaluate_matrix,
        crate::api::calculation_handlers::evaluate_statistics,
        crate::api::calculation_handlers::convert_number,
        crate::api::health_handlers::health_check,
        common::admin_api::get_log_level,
        common::admin_api::set_log_level
    ),
    components(
        schemas(
            scicalc::trigonometry::TrigFunction,
            scicalc::trigonometry::AngleUnit,
            scicalc::logarithms::LogFunction,
            scicalc::complex_numbers::ComplexOperation,
            scicalc::calculus::CalculusOperation,
            scicalc::matrices::MatrixOperation,
            scicalc::matrices::MatrixResult,
            scicalc::statistics::StatisticsOperation,
            errors::ErrorInfo
        )
    ),
    tags(
        (name = "calculator", description = "Scientific calculator operations"),
        (name = "health", description = "Service health"),
        (name = "admin", description = "Runtime administration")
    )
)]
pub struct CalcsrvApiDoc;

/// CORS policy from configuration; unparsable origins are skipped
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            },
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Create all API routes for the calculator service
pub fn create_routes(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Calculator endpoints
        .route("/arithmetic/evaluate", post(evaluate_arithmetic))
        .route("/trigonometry/evaluate", post(evaluate_trigonometry))
        .route("/logarithms/evaluate", post(evaluate_logarithm))
        .route("/algebra/poly-solve", post(solve_polynomial))
        .route("/complex/evaluate", post(evaluate_complex))
        .route("/calculus/evaluate", post(evaluate_calculus))
        .route("/matrices/evaluate", post(evaluate_matrix))
        .route("/statistics/evaluate", post(evaluate_statistics))
        .route("/numbers/convert", post(convert_number))
        // Runtime log level
        .route("/admin/log-level", get(get_log_level).put(set_log_level))
        .layer(middleware::from_fn(common::logging::http_request_logger))
        .layer(cors)
        .with_state(state)
}

#[cfg(all(test, feature = "openapi"))]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = CalcsrvApiDoc::openapi();
        for path in [
            "/arithmetic/evaluate",
            "/trigonometry/evaluate",
            "/logarithms/evaluate",
            "/algebra/poly-solve",
            "/complex/evaluate",
            "/calculus/evaluate",
            "/matrices/evaluate",
            "/statistics/evaluate",
            "/numbers/convert",
            "/health",
            "/admin/log-level",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }
}
