//! Unified logging for calculator services
//!
//! Console output uses a bracketed level format (or JSON lines), an optional
//! daily file sink is written through a non-blocking appender, and the level
//! filter sits behind a reload handle so it can be changed at runtime.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by [`http_request_logger`]
pub const API_ACCESS_TARGET: &str = "api_access";

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "\x1b[35m",
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    }
}

/// `2026-01-02T03:04:05.123456Z [INFO] scicalc::matrices: message`
///
/// The target is omitted on the console and kept in files.
struct BracketedLevelFormat {
    show_target: bool,
}

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let metadata = event.metadata();
        let level = metadata.level();
        if writer.has_ansi_escapes() {
            write!(writer, "{}{}\x1b[0m ", level_color(level), format_level(level))?;
        } else {
            write!(writer, "{} ", format_level(level))?;
        }
        if self.show_target {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type EnvFilterReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
static LOG_FILTER_HANDLE: OnceLock<EnvFilterReloadHandle> = OnceLock::new();
static CURRENT_LOG_LEVEL: OnceLock<Mutex<String>> = OnceLock::new();
// Keeps the file appender flushing until process exit
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as the log file prefix
    pub service_name: String,
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    /// JSON lines instead of the bracketed format
    pub json: bool,
    /// Directory for `{service}.log.YYYY-MM-DD` files
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogLevelError {
    #[error("Invalid log level '{level}': {reason}")]
    Invalid { level: String, reason: String },

    #[error("Logging not initialized with reload support")]
    NotInitialized,

    #[error("Failed to reload log filter: {0}")]
    Reload(String),
}

/// Filter directive for the subscriber
///
/// `RUST_LOG` wins when set. `api_access` is appended unless already named,
/// at DEBUG when the base filter is verbose so request bodies are visible.
pub fn filter_directive(level: &str, rust_log: Option<&str>) -> String {
    let base = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(level);
    if base.contains(API_ACCESS_TARGET) {
        return base.to_string();
    }
    let api_level = if base.contains("debug") || base.contains("trace") {
        "debug"
    } else {
        "info"
    };
    format!("{},{}={}", base, API_ACCESS_TARGET, api_level)
}

/// Initialize the global subscriber
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(&config.level, rust_log.as_deref());
    let env_filter = EnvFilter::try_new(&directive)?;

    let (reload_filter, reload_handle) = reload::Layer::new(env_filter);
    let _ = LOG_FILTER_HANDLE.set(reload_handle);
    let _ = CURRENT_LOG_LEVEL.set(Mutex::new(directive.clone()));

    let console_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_ansi(true)
            .event_format(BracketedLevelFormat { show_target: false })
            .boxed()
    };

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.service_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let layer = if config.json {
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat { show_target: true })
                    .boxed()
            };
            Some(layer)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(reload_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        "Logging: {} filter={} dir={:?}",
        config.service_name,
        directive,
        config.log_dir
    );
    Ok(())
}

/// Replace the active filter, e.g. `"debug"` or `"info,scicalc=trace"`
pub fn set_log_level(level: &str) -> Result<(), LogLevelError> {
    let new_filter = EnvFilter::try_new(level).map_err(|e| LogLevelError::Invalid {
        level: level.to_string(),
        reason: e.to_string(),
    })?;
    let handle = LOG_FILTER_HANDLE
        .get()
        .ok_or(LogLevelError::NotInitialized)?;
    handle
        .reload(new_filter)
        .map_err(|e| LogLevelError::Reload(e.to_string()))?;

    if let Some(current) = CURRENT_LOG_LEVEL.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Current filter string, or `"unknown"` before initialization
pub fn get_log_level() -> String {
    CURRENT_LOG_LEVEL
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Cut `body` to at most `max_length` bytes on a char boundary
fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut end = max_length;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..end], body.len() - end)
}

/// Largest request body buffered for DEBUG logging, matching axum's default `Json` limit
#[cfg(feature = "axum")]
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// HTTP request logger middleware
///
/// - **INFO**: every POST (method, path, status, duration)
/// - **DEBUG**: every request, with the JSON body truncated to 500 bytes
///
/// A body that cannot be buffered within [`MAX_BUFFERED_BODY`] is answered
/// with 413 and never reaches the handler.
///
/// Events use the `api_access` target. Add it before `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     .route("/arithmetic/evaluate", post(evaluate_arithmetic))
///     .layer(middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use axum::http::Method;
    use axum::response::IntoResponse;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled, warn};

    use crate::api_types::AppError;

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_json = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    let start = Instant::now();

    let read_body = level_enabled!(Level::DEBUG) && method == Method::POST && is_json;
    let (req, body_str) = if read_body {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
            Ok(b) => b,
            Err(e) => {
                warn!(
                    target: "api_access",
                    method = %method,
                    path = %path,
                    status = 413u16,
                    "Failed to read request body: {}", e
                );
                return AppError::payload_too_large(format!(
                    "request body could not be read within {} bytes",
                    MAX_BUFFERED_BODY
                ))
                .into_response();
            },
        };
        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(s, MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };
        (axum::extract::Request::from_parts(parts, Body::from(bytes)), Some(body_str))
    } else {
        (req, None)
    };

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if method == Method::POST => info!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
        None => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
    }

    response
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_from_config_level() {
        assert_eq!(filter_directive("info", None), "info,api_access=info");
        assert_eq!(filter_directive("debug", None), "debug,api_access=debug");
        assert_eq!(filter_directive("warn", Some("  ")), "warn,api_access=info");
    }

    #[test]
    fn test_filter_directive_prefers_rust_log() {
        assert_eq!(
            filter_directive("info", Some("warn,scicalc=trace")),
            "warn,scicalc=trace,api_access=debug"
        );
        assert_eq!(
            filter_directive("info", Some("error,api_access=off")),
            "error,api_access=off"
        );
    }

    #[test]
    fn test_filter_directive_is_valid_env_filter() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(filter_directive(level, None)).is_ok());
        }
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 10), "short");
        let long = "a".repeat(20);
        assert_eq!(truncate_body(&long, 5), "aaaaa[truncated 15 bytes]");
        // 'é' is two bytes; never split it
        assert_eq!(truncate_body("ééé", 3), "é[truncated 4 bytes]");
    }

    #[test]
    fn test_set_log_level_rejects_bad_directive() {
        let err = set_log_level("info,scicalc=loud").unwrap_err();
        assert!(matches!(err, LogLevelError::Invalid { .. }));
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_unreadable_body_answers_413_at_debug() {
        use axum::{
            body::Body,
            http::{Request, StatusCode},
            middleware,
            routing::post,
            Router,
        };
        use tower::ServiceExt;

        // Thread-local subscriber; the current-thread runtime keeps it in scope
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = Router::new()
            .route("/echo", post(|body: String| async move { body.len().to_string() }))
            .layer(middleware::from_fn(http_request_logger));
        let json_post = |body: String| {
            Request::post("/echo")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(json_post("1".repeat(MAX_BUFFERED_BODY + 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], 413);
        assert_eq!(json["error"]["error_code"], "PAYLOAD_TOO_LARGE");

        let response = app.oneshot(json_post("[1, 2]".into())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"6");
    }

    #[test]
    fn test_log_level_before_init() {
        assert_eq!(get_log_level(), "unknown");
        assert!(matches!(
            set_log_level("debug"),
            Err(LogLevelError::NotInitialized)
        ));
    }
}
