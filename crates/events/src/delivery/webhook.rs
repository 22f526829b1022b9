//! Webhook delivery.
//!
//! [`WebhookDelivery`] sends a JSON payload to an external URL via HTTP
//! POST. Each job gets exactly one attempt — a failed send is terminal and
//! is recorded by the dispatcher, never requeued.

use std::time::Duration;

/// HTTP request timeout for a delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers notification payloads to external webhook endpoints.
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// POST a payload to a webhook URL. One attempt, no retry.
    pub async fn deliver(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;

        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(url, "Webhook delivered");
        Ok(())
    }
}

impl Default for WebhookDelivery {
    fn default() -> Self {
        Self::new()
    }
}
