//! Health check handler

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::HealthStatus;

use crate::AppState;

/// Liveness check
///
/// @route GET /health
/// @output Json<HealthStatus> - {status: "ok", service, version}
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, body = HealthStatus,
        example = json!({"status": "ok", "service": "calcsrv", "version": "0.1.0"})))
))]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(
        state.config.service_name.clone(),
        env!("CARGO_PKG_VERSION"),
    ))
}
