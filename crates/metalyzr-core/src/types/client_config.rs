//! Client runtime configuration
//!
//! Every field has a serde default so a partial YAML file (or none at all)
//! still produces a complete configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default persistence key for the shared dashboard state
pub const DEFAULT_PERSISTENCE_KEY: &str = "metalyzr-admin";

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy applied to every request unless overridden per call
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Dashboard polling settings
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Shared state persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ApiConfig {
    /// Per-attempt timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff strategy between attempts
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Growth factor for exponential backoff
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Delay before the second attempt, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay, in milliseconds; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

impl RetryPolicy {
    /// Exponential policy with the given attempt budget and base delay
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: base_delay.as_millis() as u64,
            ..Self::default()
        }
    }

    /// Base delay as a `Duration`
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_initial_delay() -> u64 {
    1000
}

/// Backoff strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Retry immediately
    None,

    /// Same delay before every retry
    FixedDelay,

    /// Delay grows by `backoff_multiplier` per failed attempt
    #[default]
    ExponentialBackoff,
}

/// Dashboard polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardConfig {
    /// Interval between automatic refreshes, in seconds (0 disables polling)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl DashboardConfig {
    /// Refresh interval, or `None` when polling is disabled
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    30
}

/// Shared state persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PersistenceConfig {
    /// Persist stats and last-update timestamp between runs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Namespaced storage key
    #[serde(default = "default_persistence_key")]
    pub key: String,

    /// Storage directory; `~/.metalyzr` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: default_persistence_key(),
            dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_persistence_key() -> String {
    DEFAULT_PERSISTENCE_KEY.to_string()
}
