//! Feed Configuration Settings
//!
//! Configuration types for the execution feed client, loaded from
//! environment variables.

use std::time::Duration;

/// Bybit API credentials.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Endpoints and credentials for one exchange connection.
///
/// Created once at startup and read-only thereafter; the supervisor shares
/// it with the stream session and the recovery service.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// API credentials used for both stream auth and REST signing.
    pub credentials: Credentials,
    /// Private WebSocket endpoint URL.
    pub ws_url: String,
    /// REST base URL for the recovery query interface.
    pub rest_url: String,
}

/// Settings for the gap-recovery pass.
#[derive(Debug, Clone)]
pub struct RecoverySettings {
    /// Symbols reconciled after a reconnect, in iteration order.
    pub symbols: Vec<String>,
    /// Receive window forwarded to the exchange on signed requests, in ms.
    pub recv_window_ms: u64,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            recv_window_ms: 25_000,
        }
    }
}

/// Settings for the reconnect backoff schedule.
#[derive(Debug, Clone)]
pub struct BackoffSettings {
    /// Per-attempt delay increment.
    pub step: Duration,
    /// Cap on the computed delay.
    pub max_delay: Duration,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Complete feed client configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Exchange endpoints and credentials.
    pub connection: ConnectionOptions,
    /// Gap-recovery settings.
    pub recovery: RecoverySettings,
    /// Reconnect backoff settings.
    pub backoff: BackoffSettings,
}

impl FeedConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing
    /// or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("BYBIT_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("BYBIT_API_KEY".to_string()))?;

        let api_secret = std::env::var("BYBIT_API_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("BYBIT_API_SECRET".to_string()))?;

        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("BYBIT_API_KEY".to_string()));
        }

        if api_secret.is_empty() {
            return Err(ConfigError::EmptyValue("BYBIT_API_SECRET".to_string()));
        }

        let ws_url = env_or("BYBIT_WS_URL", "wss://stream.bybit.com/v5/private");
        let rest_url = env_or("BYBIT_REST_URL", "https://api.bybit.com");

        let symbols = std::env::var("FEED_SYMBOLS")
            .map(|raw| parse_symbols(&raw))
            .unwrap_or_default();
        let symbols = if symbols.is_empty() {
            RecoverySettings::default().symbols
        } else {
            symbols
        };

        let recovery = RecoverySettings {
            symbols,
            recv_window_ms: parse_env_u64(
                "FEED_RECV_WINDOW_MS",
                RecoverySettings::default().recv_window_ms,
            ),
        };

        let backoff = BackoffSettings {
            step: parse_env_duration_secs("FEED_BACKOFF_STEP_SECS", BackoffSettings::default().step),
            max_delay: parse_env_duration_secs(
                "FEED_BACKOFF_MAX_SECS",
                BackoffSettings::default().max_delay,
            ),
        };

        Ok(Self {
            connection: ConnectionOptions {
                credentials: Credentials::new(api_key, api_secret),
                ws_url,
                rest_url,
            },
            recovery,
            backoff,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

/// Split a comma-separated symbol list, dropping empty entries.
fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
