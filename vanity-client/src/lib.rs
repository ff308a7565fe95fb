//! Vanity HTTP Client
//!
//! A small, type-safe client for a vanity address generation service. The
//! service searches for keypairs in the background; the client submits a job,
//! then polls its status until the job completes or fails.
//!
//! # Example
//!
//! ```no_run
//! use vanity_client::VanityClient;
//! use vanity_core::domain::vanity::GenerationRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = VanityClient::new("http://localhost:3001");
//!
//!     let result = client.generate(&GenerationRequest::prefix("abc")?).await?;
//!
//!     println!("Public key: {}", result.public_key);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod health;
mod jobs;
pub mod poller;
pub mod retry;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use poller::{Sleeper, StatusPoller, StatusSource, TokioSleeper};
pub use retry::RetryPolicy;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the generation service
///
/// Endpoints are grouped as:
/// - Job lifecycle (submit, status, cancel, generate)
/// - Service health
#[derive(Debug, Clone)]
pub struct VanityClient {
    /// Base URL of the service (e.g., "http://localhost:3001")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Retry policy for transport faults
    retry: RetryPolicy,
    /// Poll loop used by `generate` and `wait_for_result`
    poller: StatusPoller,
}

impl VanityClient {
    /// Create a new client with default polling and retry settings
    ///
    /// # Example
    /// ```
    /// use vanity_client::VanityClient;
    ///
    /// let client = VanityClient::new("http://localhost:3001");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let config = ClientConfig::new(base_url);
        Self {
            poller: StatusPoller::from_config(&config),
            retry: config.retry_policy(),
            base_url: config.base_url,
            client,
        }
    }

    /// Create a client from a validated configuration
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use vanity_client::{ClientConfig, VanityClient};
    ///
    /// let config = ClientConfig::new("http://localhost:3001")
    ///     .with_poll_interval(Duration::from_millis(500))
    ///     .with_max_attempts(120);
    /// let client = VanityClient::from_config(&config).unwrap();
    /// ```
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::InvalidConfig(format!("{:#}", e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: config.base_url.clone(),
            client: builder.build()?,
            retry: config.retry_policy(),
            poller: StatusPoller::from_config(config),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the poll loop settings
    pub fn with_poller(mut self, poller: StatusPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
