//! Client configuration
//!
//! Endpoint, polling and retry settings. Everything has a default matching
//! a generation service running locally on port 3001.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default service origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL (e.g., "http://localhost:3001")
    pub base_url: String,

    /// Delay between status queries while a job is running
    pub poll_interval: Duration,

    /// Upper bound on status queries per job, `None` polls until terminal
    pub max_attempts: Option<u32>,

    /// Timeout applied to each HTTP request
    pub request_timeout: Option<Duration>,

    /// How many times a transient transport fault is retried
    pub transport_retries: u32,

    /// First retry delay, doubled after each retry
    pub retry_backoff: Duration,
}

impl ClientConfig {
    /// Creates a new configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(1),
            max_attempts: None,
            request_timeout: Some(Duration::from_secs(30)),
            transport_retries: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - VANITY_BASE_URL (optional, default: http://localhost:3001)
    /// - VANITY_POLL_INTERVAL_MS (optional, milliseconds, default: 1000)
    /// - VANITY_MAX_ATTEMPTS (optional, default: unbounded)
    /// - VANITY_REQUEST_TIMEOUT (optional, seconds, 0 disables, default: 30)
    /// - VANITY_TRANSPORT_RETRIES (optional, default: 3)
    /// - VANITY_RETRY_BACKOFF_MS (optional, milliseconds, default: 250)
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("VANITY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);

        if let Some(ms) = env_parse::<u64>("VANITY_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(attempts) = env_parse::<u32>("VANITY_MAX_ATTEMPTS")? {
            config.max_attempts = Some(attempts);
        }

        if let Some(secs) = env_parse::<u64>("VANITY_REQUEST_TIMEOUT")? {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(retries) = env_parse::<u32>("VANITY_TRANSPORT_RETRIES")? {
            config.transport_retries = retries;
        }

        if let Some(ms) = env_parse::<u64>("VANITY_RETRY_BACKOFF_MS")? {
            config.retry_backoff = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Caps the number of status queries per job
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Retry policy for transport faults
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.transport_retries, self.retry_backoff)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_attempts == Some(0) {
            anyhow::bail!("max_attempts must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(None),
    }
}
