mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str, CONFIG_PATH_ENV, ENV_PREFIX};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Checker configuration not found at {0}")]
    FileNotFound(String),

    #[error("Failed to parse checker configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// The configured tour date is not a `YYYY-MM-DD` calendar date.
    #[error("Tour date '{date}' is not YYYY-MM-DD: {reason}")]
    InvalidDate { date: String, reason: String },
}
