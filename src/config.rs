//! Session configuration
//!
//! Everything a client needs to talk to one wiki, loaded from YAML. Each
//! component receives the part it needs explicitly; nothing here is global.

use crate::auth::AuthSettings;
use crate::error::{Error, Result, ResultExt};
use crate::executor::ExecutorConfig;
use crate::http::{HttpTransportConfig, RateLimiterConfig};
use crate::session::Credentials;
use crate::types::{AssertMode, BackoffType, NoneIfEmpty};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Session Config
// ============================================================================

/// Complete client configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute URL of the wiki's `api.php`
    pub api_url: String,

    /// User-Agent header; a crate default is used when unset
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum attempts per logical request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Client-side rate limit; unlimited when unset
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Assertion applied to mutating calls
    #[serde(default = "default_assert")]
    pub assert: AssertMode,

    /// Skip the assertion on mutating calls
    #[serde(default)]
    pub allow_logged_out_edits: bool,

    /// Recover a failed bot assertion by logging in again
    #[serde(default)]
    pub bot_assert_fallback: bool,

    /// Recency window in seconds for recognising our own edit after a 503
    #[serde(default = "default_mutation_window")]
    pub mutation_window_secs: u64,

    /// Password login
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Request signing
    #[serde(default)]
    pub auth: AuthSettings,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    crate::executor::DEFAULT_MAX_ATTEMPTS
}

fn default_assert() -> AssertMode {
    AssertMode::User
}

fn default_mutation_window() -> u64 {
    120
}

impl SessionConfig {
    /// Create a config with defaults for everything but the endpoint
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            user_agent: None,
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            backoff: BackoffConfig::default(),
            rate_limit: None,
            assert: default_assert(),
            allow_logged_out_edits: false,
            bot_assert_fallback: false,
            mutation_window_secs: default_mutation_window(),
            credentials: None,
            auth: AuthSettings::None,
        }
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values that cannot work
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "api_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }
        if let Some(credentials) = &self.credentials {
            if credentials.username.is_empty() {
                return Err(Error::config("credentials.username cannot be empty"));
            }
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 {
                return Err(Error::config("rate_limit.requests_per_second must be positive"));
            }
        }
        Ok(())
    }

    /// Assertion for a call, given whether it mutates
    pub fn assert_for(&self, mutating: bool) -> AssertMode {
        if !mutating || self.allow_logged_out_edits {
            AssertMode::None
        } else {
            self.assert
        }
    }

    /// Credentials with a non-empty username, if any
    pub fn login_credentials(&self) -> Option<Credentials> {
        let credentials = self.credentials.as_ref()?;
        credentials
            .username
            .clone()
            .none_if_empty()
            .map(|_| credentials.clone())
    }

    /// Executor settings
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_attempts: self.max_attempts,
            backoff_type: self.backoff.backoff_type,
            initial_backoff: Duration::from_millis(self.backoff.initial_ms),
            max_backoff: Duration::from_millis(self.backoff.max_ms),
            bot_assert_fallback: self.bot_assert_fallback,
            mutation_window: Duration::from_secs(self.mutation_window_secs),
        }
    }

    /// Transport settings
    pub fn transport_config(&self) -> HttpTransportConfig {
        let mut builder = HttpTransportConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs));
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        if let Some(agent) = self.user_agent.clone().none_if_empty() {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

// ============================================================================
// Backoff Config
// ============================================================================

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Delay before the first retry in milliseconds
    #[serde(default)]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Constant,
            initial_ms: 0,
            max_ms: default_max_ms(),
        }
    }
}

fn default_max_ms() -> u64 {
    60000
}
