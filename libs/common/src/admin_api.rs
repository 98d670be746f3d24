//! Runtime administration endpoints shared by services

use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::api_types::{ApiJson, AppError, SuccessResponse};
use crate::logging::{self, LogLevelError};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SetLogLevelRequest {
    /// Level or filter directive, e.g. `debug` or `info,scicalc=trace`
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LogLevelResponse {
    pub level: String,
}

impl From<LogLevelError> for AppError {
    fn from(err: LogLevelError) -> Self {
        match err {
            LogLevelError::Invalid { .. } => Self::unprocessable("INVALID_LOG_LEVEL", err.to_string()),
            LogLevelError::NotInitialized => Self::service_unavailable(err.to_string()),
            LogLevelError::Reload(_) => Self::internal_error(err.to_string()),
        }
    }
}

/// Current log filter
///
/// @route GET /admin/log-level
/// @output Json<SuccessResponse<LogLevelResponse>>
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/log-level",
    tag = "admin",
    responses((status = 200, body = SuccessResponse<LogLevelResponse>))
))]
pub async fn get_log_level() -> Json<SuccessResponse<LogLevelResponse>> {
    Json(SuccessResponse::new(LogLevelResponse {
        level: logging::get_log_level(),
    }))
}

/// Replace the log filter without restarting
///
/// @route PUT /admin/log-level
/// @input ApiJson(request): SetLogLevelRequest
/// @output Json<SuccessResponse<LogLevelResponse>>
/// @status 422 - Not a valid filter directive
/// @status 503 - Logging was initialized without reload support
/// @example
/// ```json
/// {"level": "info,scicalc=debug"}
/// ```
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/admin/log-level",
    tag = "admin",
    request_body = SetLogLevelRequest,
    responses(
        (status = 200, body = SuccessResponse<LogLevelResponse>),
        (status = 422, body = crate::api_types::ErrorResponse),
        (status = 503, body = crate::api_types::ErrorResponse)
    )
))]
pub async fn set_log_level(
    ApiJson(request): ApiJson<SetLogLevelRequest>,
) -> Result<Json<SuccessResponse<LogLevelResponse>>, AppError> {
    logging::set_log_level(request.level.trim())?;
    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: logging::get_log_level(),
    })))
}
