//! Server configuration

use std::time::Duration;

use serde::Deserialize;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server to
    ///
    /// Default: `[::]:8080`
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Per-client limits on `/api/contact`
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Sliding-window limit on submissions per client
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Set to `false` to let every request through
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Length of the trailing window, in milliseconds
    ///
    /// Default: 600000 (10 minutes)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests allowed per client within the window
    ///
    /// Default: 6
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Maximum number of clients tracked at once; unbounded when unset
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            capacity: None,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

fn default_listen_address() -> String {
    "[::]:8080".to_string()
}

const fn default_enabled() -> bool {
    true
}

const fn default_window_ms() -> u64 {
    10 * 60 * 1000
}

const fn default_max_requests() -> usize {
    6
}
