//! Client configuration management.
//!
//! Environment variables (optionally from `.env`) with CLI overrides on top.

use std::{path::PathBuf, time::Duration};
use table_sync::ReconnectPolicy;

/// Default table server endpoint
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080/ws";

/// Default log file used in TUI mode
pub const DEFAULT_LOG_FILE: &str = "ts_client.log";

/// Complete client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Websocket endpoint of the table server
    pub server_url: String,
    /// Name to join with; `None` means ask at the table
    pub player_name: Option<String>,
    /// Reconnect backoff configuration
    pub reconnect: ReconnectConfig,
    /// Where logs go in TUI mode
    pub log_file: PathBuf,
    /// Whether to run the terminal UI instead of line mode
    pub use_tui: bool,
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt, in milliseconds
    pub base_ms: u64,
    /// Cap on any single delay, in milliseconds
    pub max_ms: u64,
    /// Consecutive failures before giving up
    pub attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_ms: 1000,
            max_ms: 30_000,
            attempts: 10,
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            base_delay: Duration::from_millis(self.base_ms),
            max_delay: Duration::from_millis(self.max_ms),
            max_attempts: self.attempts,
        }
    }
}

/// CLI values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub player_name: Option<String>,
    pub use_tui: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the loaded values fail [`ClientConfig::validate`]
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let server_url = overrides
            .server_url
            .or_else(|| std::env::var("TABLE_SERVER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let player_name = overrides
            .player_name
            .or_else(|| std::env::var("TABLE_PLAYER_NAME").ok())
            .unwrap_or_else(whoami::username);
        let player_name = Some(player_name.trim().to_string()).filter(|name| !name.is_empty());

        let defaults = ReconnectConfig::default();
        let reconnect = ReconnectConfig {
            base_ms: parse_env_or("TABLE_RECONNECT_BASE_MS", defaults.base_ms),
            max_ms: parse_env_or("TABLE_RECONNECT_MAX_MS", defaults.max_ms),
            attempts: parse_env_or("TABLE_RECONNECT_ATTEMPTS", defaults.attempts),
        };

        let log_file = std::env::var("TABLE_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));

        let config = ClientConfig {
            server_url,
            player_name,
            reconnect,
            log_file,
            use_tui: overrides.use_tui,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid {
                var: "TABLE_SERVER_URL".to_string(),
                reason: format!("Must be a ws:// or wss:// URL, got '{}'", self.server_url),
            });
        }

        if self.reconnect.base_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_RECONNECT_BASE_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.reconnect.max_ms < self.reconnect.base_ms {
            return Err(ConfigError::Invalid {
                var: "TABLE_RECONNECT_MAX_MS".to_string(),
                reason: format!(
                    "Must be at least the base delay ({})",
                    self.reconnect.base_ms
                ),
            });
        }

        if self.reconnect.attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_RECONNECT_ATTEMPTS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
