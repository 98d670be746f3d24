//! Shared API envelopes for calculator services
//!
//! Every endpoint answers with one of two bodies:
//! - `{"success": true, "data": ...}` ([`SuccessResponse`])
//! - `{"success": false, "error": {...}}` ([`ErrorResponse`])

use errors::{CalcError, ErrorInfo};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// ============================================================================
// Standard API Response Models
// ============================================================================

/// Standard success response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SuccessResponse<T> {
    /// Success indicator (always true)
    #[serde(default = "crate::serde_helpers::bool_true")]
    pub success: bool,
    /// Response data
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    /// Success indicator (always false for errors)
    #[serde(default = "crate::serde_helpers::bool_false")]
    pub success: bool,
    /// Error information
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(error: ErrorInfo) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Liveness check body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthStatus {
    /// Always `"ok"` while the process serves requests
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthStatus {
    pub fn ok(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.into(),
            version: version.into(),
        }
    }
}

// ============================================================================
// HTTP integration
// ============================================================================

#[cfg(feature = "axum")]
pub use http::{ApiJson, AppError};

#[cfg(feature = "axum")]
mod http {
    use super::{CalcError, ErrorInfo, ErrorResponse};
    use axum::{
        extract::{rejection::JsonRejection, FromRequest, Request},
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    };
    use serde::de::DeserializeOwned;
    use tracing::{debug, info, warn, Level};

    /// Application error with HTTP status code
    #[derive(Debug, Clone)]
    pub struct AppError {
        /// HTTP status code
        pub status: StatusCode,
        /// Error information
        pub error: ErrorInfo,
    }

    impl AppError {
        pub fn new(status: StatusCode, error: ErrorInfo) -> Self {
            let error = error.with_code(status.as_u16());
            Self { status, error }
        }

        /// 422 with a machine code, for request bodies rejected before dispatch
        pub fn unprocessable(error_code: &str, message: impl Into<String>) -> Self {
            Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorInfo::new(message).with_error_code(error_code),
            )
        }

        pub fn payload_too_large(message: impl Into<String>) -> Self {
            Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorInfo::new(message).with_error_code("PAYLOAD_TOO_LARGE"),
            )
        }

        pub fn service_unavailable(message: impl Into<String>) -> Self {
            Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorInfo::new(message).with_error_code("SERVICE_UNAVAILABLE"),
            )
        }

        pub fn internal_error(message: impl Into<String>) -> Self {
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorInfo::new(message).with_error_code("INTERNAL_ERROR"),
            )
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            (self.status, Json(ErrorResponse::new(self.error))).into_response()
        }
    }

    impl From<CalcError> for AppError {
        fn from(err: CalcError) -> Self {
            let code = err.error_code();
            let level = err.log_level();
            if level <= Level::WARN {
                warn!(code, "Request rejected: {}", err);
            } else if level == Level::INFO {
                info!(code, "Request rejected: {}", err);
            } else {
                debug!(code, "Request rejected: {}", err);
            }
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            Self {
                status,
                error: err.to_error_info(),
            }
        }
    }

    impl From<JsonRejection> for AppError {
        fn from(rejection: JsonRejection) -> Self {
            let error_code = match &rejection {
                JsonRejection::JsonDataError(_) => "INVALID_REQUEST_BODY",
                JsonRejection::JsonSyntaxError(_) => "MALFORMED_JSON",
                JsonRejection::MissingJsonContentType(_) => "UNSUPPORTED_MEDIA_TYPE",
                _ => "UNREADABLE_BODY",
            };
            debug!(code = error_code, "Request body rejected: {}", rejection.body_text());
            Self::new(
                rejection.status(),
                ErrorInfo::new(rejection.body_text()).with_error_code(error_code),
            )
        }
    }

    /// `Json` extractor whose rejections use the standard error envelope
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ApiJson<T>(pub T);

    impl<T, S> FromRequest<S> for ApiJson<T>
    where
        T: DeserializeOwned,
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}
