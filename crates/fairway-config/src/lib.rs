//! # Fairway Config
//!
//! Configuration management for the Fairway golf-data layer.
//! Supports layered configuration from files and environment variables,
//! validated up front so misconfiguration fails at startup.

mod app_config;
mod loader;
mod provider_kind;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use provider_kind::*;
pub use validation::*;
