//! Service configuration building blocks
//!
//! Services compose their configuration from the sections below and load it
//! with [`load_config`]. Sources are merged lowest to highest priority:
//!
//! 1. `T::default()`
//! 2. YAML file (`config/{service}.yaml`, or an explicit path)
//! 3. Environment variables prefixed `{SERVICE}_`, nested keys split on `__`
//!    (e.g. `CALCSRV_API__PORT=9000`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// API server configuration
///
/// Note: port has no serde default; each service sets its own in `Default`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen host address
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Listen port
    pub port: u16,
}

impl ApiConfig {
    pub fn new(port: u16) -> Self {
        Self {
            host: default_api_host(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of the bracketed text format
    #[serde(default)]
    pub json: bool,

    /// Directory for daily log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

/// Cross-origin policy for the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

pub fn validate_log_level(level: &str) -> Result<(), ConfigError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "unknown log level '{}'; expected one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

pub fn default_config_path(service_name: &str) -> PathBuf {
    PathBuf::from(format!("config/{}.yaml", service_name))
}

/// Load a service configuration from defaults, YAML file and environment
///
/// An explicit `file` must exist; the default path is optional.
pub fn load_config<T>(service_name: &str, file: Option<&Path>) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned + Default,
{
    let path = match file {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => path.to_path_buf(),
        None => default_config_path(service_name),
    };
    let env_prefix = format!("{}_", service_name.to_uppercase());
    debug!("Loading configuration: file={}, env_prefix={}", path.display(), env_prefix);

    let config = Figment::new()
        .merge(Serialized::defaults(T::default()))
        .merge(Yaml::file(&path))
        .merge(Env::prefixed(&env_prefix).split("__"))
        .extract()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use figment::Jail;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct DemoConfig {
        name: String,
        api: ApiConfig,
        #[serde(default)]
        log: LoggingConfig,
    }

    impl Default for DemoConfig {
        fn default() -> Self {
            Self {
                name: "demo".into(),
                api: ApiConfig::new(7000),
                log: LoggingConfig::default(),
            }
        }
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config: DemoConfig = load_config("demo", None).map_err(|e| e.to_string())?;
            assert_eq!(config, DemoConfig::default());
            assert_eq!(config.api.bind_address(), "0.0.0.0:7000");
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "demo.yaml",
                "name: from-file\napi:\n  port: 9000\nlog:\n  level: debug\n",
            )?;
            jail.set_env("DEMO_API__PORT", "9100");
            let config: DemoConfig =
                load_config("demo", Some(Path::new("demo.yaml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.name, "from-file");
            assert_eq!(config.api.port, 9100);
            assert_eq!(config.api.host, DEFAULT_API_HOST);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config::<DemoConfig>("demo", Some(Path::new("/nonexistent/demo.yaml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_value_is_load_error() {
        Jail::expect_with(|jail| {
            jail.set_env("DEMO_API__PORT", "not-a-port");
            let err = load_config::<DemoConfig>("demo", None).unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
            Ok(())
        });
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("warn").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_cors_any_origin() {
        assert!(CorsConfig::default().allows_any_origin());
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into()],
        };
        assert!(!cors.allows_any_origin());
    }
}
