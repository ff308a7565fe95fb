//! Job-related API endpoints

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};
use vanity_core::domain::job::{JobHandle, StatusSnapshot};
use vanity_core::domain::vanity::{GenerationRequest, GenerationResult, Position};
use vanity_core::dto::job::{CancelResponse, ErrorResponse, GenerateResponse};

use crate::VanityClient;
use crate::error::{ClientError, Result};
use crate::poller::{StatusSource, TokioSleeper};

impl VanityClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Start a generation job
    ///
    /// The request is only retried when the connection could not be
    /// established, so a job is never started twice.
    ///
    /// # Returns
    /// A handle to the started job
    ///
    /// # Errors
    /// [`ClientError::Submission`] when the response has no job id,
    /// whatever its HTTP status.
    pub async fn submit(&self, req: &GenerationRequest) -> Result<JobHandle> {
        info!(
            "Submitting {} generation job for pattern '{}'",
            req.position(),
            req.pattern()
        );

        let url = format!("{}/generate", self.base_url);
        let client = &self.client;
        let url = url.as_str();

        let response = self
            .retry
            .run(
                &TokioSleeper,
                "generate",
                ClientError::is_connect,
                move || async move {
                    Ok::<_, ClientError>(client.post(url).json(req).send().await?)
                },
            )
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(parsed) => match parsed.into_handle() {
                Some(handle) => {
                    info!("Job started with ID: {}", handle);
                    Ok(handle)
                }
                None => Err(ClientError::Submission(describe_failure(status, &body))),
            },
            Err(_) if !status.is_success() => Err(ClientError::api_error(status.as_u16(), body)),
            Err(e) => Err(ClientError::ParseError(format!(
                "Failed to parse generate response: {}",
                e
            ))),
        }
    }

    /// Start a generation job from a raw pattern
    ///
    /// # Errors
    /// [`ClientError::InvalidRequest`] for an empty pattern, before any
    /// request is sent.
    pub async fn submit_pattern(&self, pattern: &str, position: Position) -> Result<JobHandle> {
        let req = GenerationRequest::new(pattern, position)?;
        self.submit(&req).await
    }

    /// Query the status of a job once
    ///
    /// Reading status has no side effects, so transient faults are retried.
    /// Any body the service returns, including 4xx error bodies, is handed
    /// back as a snapshot for the caller to classify.
    pub async fn status(&self, handle: &JobHandle) -> Result<StatusSnapshot> {
        let url = format!("{}/status/{}", self.base_url, handle.job_id());
        let client = &self.client;
        let url = url.as_str();

        let body = self
            .retry
            .run(
                &TokioSleeper,
                "status query",
                ClientError::is_transient,
                move || async move {
                    let response = client.get(url).send().await?;
                    let status = response.status();
                    if status.is_server_error() {
                        let text = response.text().await.unwrap_or_default();
                        return Err(ClientError::api_error(status.as_u16(), text));
                    }
                    Ok(response.text().await?)
                },
            )
            .await?;

        debug!("Status of job {}: {}", handle, body);
        Ok(StatusSnapshot::from_body(body))
    }

    /// Ask the service to stop searching for a job
    ///
    /// The job is reported as failed afterwards. Cancelling twice is harmless.
    pub async fn cancel(&self, handle: &JobHandle) -> Result<()> {
        let url = format!("{}/cancel/{}", self.base_url, handle.job_id());
        let client = &self.client;
        let url = url.as_str();

        let resp: CancelResponse = self
            .retry
            .run(
                &TokioSleeper,
                "cancel",
                ClientError::is_transient,
                move || async move {
                    let response = client.post(url).send().await?;
                    Self::handle_response(response).await
                },
            )
            .await?;

        info!("Cancellation of job {}: {}", handle, resp.status);
        Ok(())
    }

    /// Poll a job with the client's poller until it completes or fails
    pub async fn wait_for_result(&self, handle: &JobHandle) -> Result<GenerationResult> {
        self.poller.poll_until_done(self, handle).await
    }

    /// Submit a job and wait for its result
    ///
    /// # Example
    /// ```no_run
    /// # use vanity_client::VanityClient;
    /// # use vanity_core::domain::vanity::{GenerationRequest, Position};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = VanityClient::new("http://localhost:3001");
    /// let req = GenerationRequest::new("xyz", Position::Suffix)?;
    /// let result = client.generate(&req).await?;
    /// println!("{}", result.public_key);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn generate(&self, req: &GenerationRequest) -> Result<GenerationResult> {
        let handle = self.submit(req).await?;
        let result = self.wait_for_result(&handle).await?;
        info!("Address found for job {}: {}", handle, result.public_key);
        Ok(result)
    }
}

#[async_trait]
impl StatusSource for VanityClient {
    async fn fetch_status(&self, handle: &JobHandle) -> Result<StatusSnapshot> {
        self.status(handle).await
    }
}

/// Builds the submission error message from the service's error body if it
/// sent one, otherwise from the raw body
fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("{}: {}", status, err.error),
        Err(_) => format!("{}: {}", status, body),
    }
}
