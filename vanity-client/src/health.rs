//! Health check endpoint

use crate::VanityClient;
use crate::error::{ClientError, Result};
use crate::poller::TokioSleeper;
use vanity_core::dto::health::HealthResponse;

impl VanityClient {
    /// Check that the service is up
    ///
    /// # Returns
    /// The service status and its current timestamp
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let client = &self.client;
        let url = url.as_str();

        self.retry
            .run(
                &TokioSleeper,
                "health check",
                ClientError::is_transient,
                move || async move {
                    let response = client.get(url).send().await?;
                    Self::handle_response(response).await
                },
            )
            .await
    }
}
