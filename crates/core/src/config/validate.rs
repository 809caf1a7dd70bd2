use chrono::NaiveDate;

use super::{types::Config, ConfigError, DATE_FORMAT};

/// Validate configuration
/// Currently validates:
/// - Pool size is not 0
/// - Stagger bounds are ordered
/// - Query URL is set and timeout is not 0
/// - Date, when given, is a calendar date in YYYY-MM-DD form
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.runner.pool_size == 0 {
        return Err(ConfigError::ValidationError(
            "runner.pool_size cannot be 0".to_string(),
        ));
    }

    if config.runner.stagger_min_ms > config.runner.stagger_max_ms {
        return Err(ConfigError::ValidationError(format!(
            "runner.stagger_min_ms ({}) exceeds runner.stagger_max_ms ({})",
            config.runner.stagger_min_ms, config.runner.stagger_max_ms
        )));
    }

    if config.query.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "query.url cannot be empty".to_string(),
        ));
    }

    if config.query.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "query.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(date) = &config.date {
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| ConfigError::InvalidDate {
            date: date.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(())
}
