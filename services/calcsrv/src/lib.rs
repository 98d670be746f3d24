//! calcsrv - Scientific calculator service
//!
//! HTTP front end for the `scicalc` evaluators. Each calculator module is one
//! `POST` route taking a JSON body and answering with the standard envelope:
//!
//! ```text
//! 200 {"success": true,  "data": {...}}
//! 422 {"success": false, "error": {...}}   request shape rejected
//! 400 {"success": false, "error": {...}}   computation rejected the input
//! ```

pub mod api;
pub mod config;
pub mod routes;

use config::CalcsrvConfig;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: CalcsrvConfig,
}

impl AppState {
    pub fn new(config: CalcsrvConfig) -> Self {
        Self { config }
    }
}
