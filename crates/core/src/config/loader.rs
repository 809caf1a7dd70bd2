use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;
use tracing::debug;

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "TICKET_CHECKER_";

/// Environment variable naming the configuration file.
///
/// It shares [`ENV_PREFIX`] but is not a setting, so the loader skips it.
pub const CONFIG_PATH_ENV: &str = "TICKET_CHECKER_CONFIG";

/// Load the checker configuration from a TOML file, then apply environment overrides.
///
/// Nested keys are separated by a double underscore, e.g.
/// `TICKET_CHECKER_RUNNER__POOL_SIZE=20`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    debug!(
        path = %path.display(),
        pool_size = config.runner.pool_size,
        "Checker configuration extracted"
    );

    Ok(config)
}

/// Load configuration from a TOML string, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
