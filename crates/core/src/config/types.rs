use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Date format used by the query API and the report file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Tour date to check (YYYY-MM-DD). Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// The configured tour date, or today's local date when none is set.
    pub fn target_date(&self) -> String {
        match &self.date {
            Some(date) => date.clone(),
            None => chrono::Local::now().format(DATE_FORMAT).to_string(),
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Maximum number of in-flight queries.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Wait before the single retry of a failed query (milliseconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Lower bound of the random pause before each submission (milliseconds).
    #[serde(default = "default_stagger_min")]
    pub stagger_min_ms: u64,
    /// Upper bound of the random pause before each submission (milliseconds).
    #[serde(default = "default_stagger_max")]
    pub stagger_max_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            retry_delay_ms: default_retry_delay(),
            stagger_min_ms: default_stagger_min(),
            stagger_max_ms: default_stagger_max(),
        }
    }
}

fn default_pool_size() -> usize {
    10
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_stagger_min() -> u64 {
    100
}

fn default_stagger_max() -> u64 {
    300
}

/// Remote query API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Ticket query endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Merchant code sent as `m_code`.
    #[serde(default = "default_merchant_code")]
    pub merchant_code: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            merchant_code: default_merchant_code(),
            timeout_secs: default_timeout(),
            accept_invalid_certs: false,
        }
    }
}

fn default_url() -> String {
    "https://appmall.ciotour.com/electronic-code/ticket-query".to_string()
}

fn default_merchant_code() -> String {
    "dwr1Op9C3C5qVSng3ZWSFA".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Task list input configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("check.txt")
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory receiving the spreadsheet report.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// File name of the failure list, relative to `dir`.
    #[serde(default = "default_failures_file")]
    pub failures_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            failures_file: default_failures_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_failures_file() -> String {
    "fail.txt".to_string()
}

/// Sanitized config for logging (merchant code redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub date: String,
    pub runner: RunnerConfig,
    pub query: SanitizedQueryConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQueryConfig {
    pub url: String,
    pub merchant_code_configured: bool,
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            date: config.target_date(),
            runner: config.runner.clone(),
            query: SanitizedQueryConfig {
                url: config.query.url.clone(),
                merchant_code_configured: !config.query.merchant_code.is_empty(),
                timeout_secs: config.query.timeout_secs,
                accept_invalid_certs: config.query.accept_invalid_certs,
            },
            input: config.input.clone(),
            output: config.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.date.is_none());
        assert_eq!(config.runner.pool_size, 10);
        assert_eq!(config.runner.retry_delay_ms, 1000);
        assert_eq!(config.runner.stagger_min_ms, 100);
        assert_eq!(config.runner.stagger_max_ms, 300);
        assert_eq!(config.query.timeout_secs, 10);
        assert!(!config.query.accept_invalid_certs);
        assert_eq!(config.input.path.to_str().unwrap(), "check.txt");
        assert_eq!(config.output.failures_file, "fail.txt");
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
date = "2024-10-10"

[runner]
pool_size = 4
retry_delay_ms = 50
stagger_min_ms = 0
stagger_max_ms = 10

[query]
url = "http://localhost:9000/ticket-query"
merchant_code = "abc"
timeout_secs = 3
accept_invalid_certs = true

[input]
path = "/data/list.txt"

[output]
dir = "/data/out"
failures_file = "retry.txt"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.date.as_deref(), Some("2024-10-10"));
        assert_eq!(config.runner.pool_size, 4);
        assert_eq!(config.runner.retry_delay_ms, 50);
        assert_eq!(config.query.url, "http://localhost:9000/ticket-query");
        assert_eq!(config.query.merchant_code, "abc");
        assert!(config.query.accept_invalid_certs);
        assert_eq!(config.input.path.to_str().unwrap(), "/data/list.txt");
        assert_eq!(config.output.dir.to_str().unwrap(), "/data/out");
        assert_eq!(config.output.failures_file, "retry.txt");
    }

    #[test]
    fn test_target_date_prefers_configured_date() {
        let config = Config {
            date: Some("2024-10-10".to_string()),
            ..Default::default()
        };
        assert_eq!(config.target_date(), "2024-10-10");
    }

    #[test]
    fn test_target_date_defaults_to_today() {
        let config = Config::default();
        let today = chrono::Local::now().format(DATE_FORMAT).to_string();
        assert_eq!(config.target_date(), today);
    }

    #[test]
    fn test_sanitized_config_hides_merchant_code() {
        let config = Config {
            date: Some("2024-10-10".to_string()),
            ..Default::default()
        };
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.query.merchant_code_configured);
        assert_eq!(sanitized.date, "2024-10-10");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains(&config.query.merchant_code));
    }
}
