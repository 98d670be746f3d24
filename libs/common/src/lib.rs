//! Shared plumbing for calculator services
//!
//! - API envelopes and the JSON extractor (`api_types`)
//! - Runtime log-level endpoints (`admin_api`)
//! - Logging initialization and request logging (`logging`)
//! - Layered configuration loading (`service_config`)
//! - Shutdown signal handling (`shutdown`)

#[cfg(feature = "axum")]
pub mod admin_api;
pub mod api_types;
pub mod logging;
pub mod serde_helpers;
pub mod service_config;
pub mod shutdown;

pub use api_types::{ErrorResponse, HealthStatus, SuccessResponse};
#[cfg(feature = "axum")]
pub use api_types::{ApiJson, AppError};
pub use service_config::{
    load_config, validate_log_level, ApiConfig, ConfigError, CorsConfig, LoggingConfig,
    DEFAULT_API_HOST, DEFAULT_LOG_LEVEL,
};
