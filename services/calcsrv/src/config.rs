//! calcsrv configuration
//!
//! ```yaml
//! service_name: calcsrv
//! api:
//!   host: 0.0.0.0
//!   port: 8000
//! log:
//!   level: info
//!   json: false
//!   dir: logs        # optional, enables daily log files
//! cors:
//!   allowed_origins: ["*"]
//! ```
//!
//! Any key can be overridden from the environment, e.g. `CALCSRV_API__PORT=9000`.

use std::path::Path;

use common::{load_config, validate_log_level, ApiConfig, ConfigError, CorsConfig, LoggingConfig};
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "calcsrv";
pub const DEFAULT_PORT: u16 = 8000;

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcsrvConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_api")]
    pub api: ApiConfig,

    #[serde(default)]
    pub log: LoggingConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_api() -> ApiConfig {
    ApiConfig::new(DEFAULT_PORT)
}

impl Default for CalcsrvConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api: default_api(),
            log: LoggingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl CalcsrvConfig {
    /// Defaults, then `file` (or `config/calcsrv.yaml`), then `CALCSRV_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = load_config(SERVICE_NAME, file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("service_name cannot be empty".into()));
        }
        if self.api.port == 0 {
            return Err(ConfigError::Invalid("api.port must be between 1 and 65535".into()));
        }
        validate_log_level(&self.log.level)?;
        Ok(())
    }
}
