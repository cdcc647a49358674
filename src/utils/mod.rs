//! Configuration and process-level helpers.

/// Tracing subscriber setup.
pub mod logging;
/// TOML configuration with hot reload.
pub mod toml_config;
