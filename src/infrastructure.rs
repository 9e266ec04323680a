//! Infrastructure layer for configuration and logging

pub mod config;  // Configuration loading and validation
pub mod logging;  // Logging infrastructure

// Re-export commonly used items
pub use config::{AppConfig, ConfigError};
pub use logging::{init_logging, init_logging_with_config};
