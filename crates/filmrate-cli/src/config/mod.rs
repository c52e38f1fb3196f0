//! Application configuration module.
//!
//! Manages the TOML config file holding the API endpoint, retry and cache
//! settings, and display preferences.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{ApiConfig, AppConfig, DisplayConfig};
pub use paths::resolve_config_path;
