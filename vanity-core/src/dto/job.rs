//! Job DTOs for the generation API

use serde::{Deserialize, Serialize};

use crate::domain::job::JobHandle;
use crate::domain::vanity::GenerationResult;

/// Body returned by `POST /generate`
///
/// `job_id` is optional on the wire: its absence is how the server reports
/// that no job was started.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl GenerateResponse {
    /// Returns a handle when the response carries a non-empty job id
    pub fn into_handle(self) -> Option<JobHandle> {
        self.job_id.and_then(|id| JobHandle::new(id).ok())
    }
}

/// Body returned by `GET /status/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body returned by `POST /cancel/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub status: String,
}

/// Error body the service sends alongside 4xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
