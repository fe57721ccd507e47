use super::{Forwarder, RecordEntry};
use async_trait::async_trait;
use std::time::Duration;

/// Errors from forwarding a record to the reporting endpoint
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("Endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Posts each entry as JSON to a fixed URL
pub struct WebhookForwarder {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl WebhookForwarder {
    pub fn new(url: String, timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WebhookError::Client)?;

        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Forwarder for WebhookForwarder {
    async fn forward(&self, entry: &RecordEntry) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .json(&entry.payload())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::Timeout(self.timeout)
                } else {
                    WebhookError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status()));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
