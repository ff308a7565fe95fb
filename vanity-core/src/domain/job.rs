//! Job domain types
//!
//! A job is observed through successive status snapshots. Each snapshot keeps
//! the raw body it was decoded from so failures can be reported verbatim.

use std::fmt;
use thiserror::Error;

use crate::domain::vanity::GenerationResult;
use crate::dto::job::StatusResponse;

/// Opaque reference to one server-side job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    job_id: String,
}

impl JobHandle {
    /// Wraps a job id, refusing the empty string
    pub fn new(job_id: impl Into<String>) -> Result<Self, StatusDecodeError> {
        let job_id = job_id.into();
        if job_id.is_empty() {
            return Err(StatusDecodeError::EmptyJobId);
        }
        Ok(Self { job_id })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.job_id)
    }
}

/// Job status as reported by the service
///
/// `Pending` and `Running` are the only non-terminal states. Once a job is
/// terminal it never goes back to running.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Running { progress: Option<f64> },
    Complete(GenerationResult),
    Failed { error: Option<String> },
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running { .. })
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running { .. } => "running",
            JobStatus::Complete(_) => "complete",
            JobStatus::Failed { .. } => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<StatusResponse> for JobStatus {
    type Error = StatusDecodeError;

    fn try_from(resp: StatusResponse) -> Result<Self, Self::Error> {
        match resp.status.as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running {
                progress: resp.progress,
            }),
            "complete" => resp
                .result
                .map(JobStatus::Complete)
                .ok_or(StatusDecodeError::MissingResult),
            // the service reports failures as "error"
            "failed" | "error" => Ok(JobStatus::Failed { error: resp.error }),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(StatusDecodeError::UnknownStatus(other.to_string())),
        }
    }
}

impl From<JobStatus> for StatusResponse {
    fn from(status: JobStatus) -> Self {
        let name = status.as_str().to_string();
        match status {
            JobStatus::Running { progress } => StatusResponse {
                status: name,
                progress,
                result: None,
                error: None,
            },
            JobStatus::Complete(result) => StatusResponse {
                status: name,
                progress: None,
                result: Some(result),
                error: None,
            },
            JobStatus::Failed { error } => StatusResponse {
                status: name,
                progress: None,
                result: None,
                error,
            },
            JobStatus::Pending | JobStatus::Cancelled => StatusResponse {
                status: name,
                progress: None,
                result: None,
                error: None,
            },
        }
    }
}

/// Reasons a status body could not be turned into a [`JobStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusDecodeError {
    #[error("malformed status body: {0}")]
    Malformed(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("complete status without a result")]
    MissingResult,

    #[error("empty job id")]
    EmptyJobId,
}

/// One status observation: the raw body and what it decoded to
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub raw: String,
    pub status: Result<JobStatus, StatusDecodeError>,
}

impl StatusSnapshot {
    /// Decodes a status body, keeping the text for diagnostics
    pub fn from_body(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let status = serde_json::from_str::<StatusResponse>(&raw)
            .map_err(|e| StatusDecodeError::Malformed(e.to_string()))
            .and_then(JobStatus::try_from);
        Self { raw, status }
    }

    pub fn is_terminal(&self) -> bool {
        match &self.status {
            Ok(status) => status.is_terminal(),
            Err(_) => true,
        }
    }
}
