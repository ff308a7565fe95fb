//! Error types for the vanity client

use thiserror::Error;
use vanity_core::domain::vanity::RequestError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the vanity client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was read
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The generate call returned no usable job id
    #[error("Failed to start generation job: {0}")]
    Submission(String),

    /// The job reached a status other than complete
    #[error("Job failed or cancelled: {payload}")]
    Poll {
        /// Raw status body as received
        payload: String,
    },

    /// Polling stopped at the configured attempt limit
    #[error("Job still not finished after {attempts} status checks (last: {last_payload})")]
    AttemptsExhausted { attempts: u32, last_payload: String },

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this error came from the transport rather than the job
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    /// Check if repeating the same request may succeed
    ///
    /// Connection failures, timeouts and gateway errors qualify. Anything the
    /// service said about the job itself does not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_connect() || e.is_timeout(),
            // bad gateway, service unavailable, gateway timeout
            Self::ApiError { status, .. } => matches!(*status, 502..=504),
            _ => false,
        }
    }

    /// Check if the request never reached the server
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_connect())
    }
}
