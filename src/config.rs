//! Configuration management for ChatGenie
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatGenieError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for ChatGenie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote chat endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Retry policy for the network step of an exchange
    #[serde(default)]
    pub retry: RetryConfig,
    /// Identity sent with every request
    #[serde(default)]
    pub user: UserConfig,
    /// Location of the persisted chat store
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the chat service; `/chat` and `/health` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single request before it is aborted
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl EndpointConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Retry configuration
///
/// `max_attempts: 1` disables retrying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of network attempts per exchange
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// User identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Name sent as `username` in chat requests
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "User".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
        }
    }
}

/// Chat store location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database path; `None` uses the platform data directory
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatGenieError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatGenieError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CHATGENIE_BASE_URL") {
            self.endpoint.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("CHATGENIE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.endpoint.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATGENIE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(attempts) = std::env::var("CHATGENIE_MAX_ATTEMPTS") {
            if let Ok(value) = attempts.parse() {
                self.retry.max_attempts = value;
            } else {
                tracing::warn!("Invalid CHATGENIE_MAX_ATTEMPTS: {}", attempts);
            }
        }

        if let Ok(delay) = std::env::var("CHATGENIE_RETRY_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.retry.delay_ms = value;
            } else {
                tracing::warn!("Invalid CHATGENIE_RETRY_DELAY_MS: {}", delay);
            }
        }

        if let Ok(username) = std::env::var("CHATGENIE_USERNAME") {
            self.user.username = username;
        }

        if let Ok(path) = std::env::var(crate::storage::STORE_PATH_ENV) {
            self.storage.path = Some(path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.store_path {
            self.storage.path = Some(path.clone());
        }

        if let Some(username) = &cli.username {
            self.user.username = username.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ChatGenieError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(
                ChatGenieError::Config("endpoint.base_url cannot be empty".to_string()).into(),
            );
        }

        let parsed = url::Url::parse(&self.endpoint.base_url).map_err(|e| {
            ChatGenieError::Config(format!(
                "Invalid endpoint.base_url '{}': {}",
                self.endpoint.base_url, e
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ChatGenieError::Config(format!(
                "endpoint.base_url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.endpoint.timeout_seconds == 0 || self.endpoint.timeout_seconds > 600 {
            return Err(ChatGenieError::Config(
                "endpoint.timeout_seconds must be between 1 and 600".to_string(),
            )
            .into());
        }

        if self.retry.max_attempts == 0 || self.retry.max_attempts > 10 {
            return Err(ChatGenieError::Config(
                "retry.max_attempts must be between 1 and 10".to_string(),
            )
            .into());
        }

        if self.retry.delay_ms > 60_000 {
            return Err(ChatGenieError::Config(
                "retry.delay_ms must be less than or equal to 60000".to_string(),
            )
            .into());
        }

        if self.user.username.trim().is_empty() {
            return Err(
                ChatGenieError::Config("user.username cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 6] = [
        "CHATGENIE_BASE_URL",
        "CHATGENIE_TIMEOUT_SECONDS",
        "CHATGENIE_MAX_ATTEMPTS",
        "CHATGENIE_RETRY_DELAY_MS",
        "CHATGENIE_USERNAME",
        "CHATGENIE_STORE_PATH",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint.base_url, "http://localhost:5000");
        assert_eq!(config.endpoint.timeout_seconds, 30);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.user.username, "User");
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = Config::default();
        config.endpoint.base_url = "ftp://localhost:5000".to_string();
        assert!(config.validate().is_err());

        config.endpoint.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.endpoint.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_timeout_bounds() {
        let mut config = Config::default();
        config.endpoint.timeout_seconds = 0;
        assert!(config.validate().is_err());
        config.endpoint.timeout_seconds = 601;
        assert!(config.validate().is_err());
        config.endpoint.timeout_seconds = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_retry_bounds() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
        config.retry.max_attempts = 3;
        config.retry.delay_ms = 60_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_username() {
        let mut config = Config::default();
        config.user.username = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
endpoint:
  base_url: "https://chat.example.com"
  timeout_seconds: 10
retry:
  max_attempts: 3
user:
  username: "ada"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.endpoint.base_url, "https://chat.example.com");
        assert_eq!(config.endpoint.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.user.username, "ada");
        assert!(config.storage.path.is_none());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let cli = crate::cli::Cli::default();

        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.endpoint.base_url, "http://localhost:5000");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        clear_env();
        std::env::set_var("CHATGENIE_BASE_URL", "http://127.0.0.1:9000");
        std::env::set_var("CHATGENIE_TIMEOUT_SECONDS", "5");
        std::env::set_var("CHATGENIE_MAX_ATTEMPTS", "3");
        std::env::set_var("CHATGENIE_USERNAME", "grace");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.endpoint.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.endpoint.timeout_seconds, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.user.username, "grace");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_unparseable_numbers() {
        clear_env();
        std::env::set_var("CHATGENIE_RETRY_DELAY_MS", "soon");

        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.retry.delay_ms, 1000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_take_precedence_over_env() {
        clear_env();
        std::env::set_var("CHATGENIE_STORE_PATH", "/tmp/from-env");

        let cli = crate::cli::Cli {
            store_path: Some("/tmp/from-cli".to_string()),
            username: Some("cli-user".to_string()),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();

        assert_eq!(config.storage.path.as_deref(), Some("/tmp/from-cli"));
        assert_eq!(config.user.username, "cli-user");

        clear_env();
    }
}
