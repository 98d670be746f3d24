//! HTTP handlers

pub mod calculation_handlers;
pub mod health_handlers;

pub use common::admin_api as admin_handlers;
