//! HTTP client for the remote text generation service.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::{GeneratedText, GenerationRequest, TextGenerator};
use crate::error::ExtractionError;
use crate::models::config::{GenerationConfig, LlmConfig};

/// Generator backed by a `POST {prompt, ...}` endpoint returning
/// `[{"generated_text": "..."}]`.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    url: String,
    params: GenerationConfig,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

enum AttemptError {
    /// Transport failure or 5xx; worth one more try.
    Retryable(String),
    /// The service answered but not with something usable.
    Fatal(String),
}

impl HttpGenerator {
    /// Create a generator for the configured endpoint.
    pub fn new(llm: &LlmConfig, params: GenerationConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .user_agent(concat!("piggy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ExtractionError::UpstreamUnavailable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: llm.prompt_url(),
            params,
            timeout: Duration::from_secs(llm.timeout_secs),
            max_retries: llm.max_retries,
            retry_backoff: Duration::from_millis(llm.retry_backoff_ms),
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Endpoint this generator posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn attempt(&self, prompt: &str) -> Result<String, AttemptError> {
        let request = GenerationRequest {
            prompt,
            params: &self.params,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Retryable(format!("request timed out after {:?}", self.timeout))
                } else {
                    AttemptError::Retryable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = format!("unexpected status {}: {}", status, body);
            return Err(if status.is_server_error() {
                AttemptError::Retryable(reason)
            } else {
                AttemptError::Fatal(reason)
            });
        }

        let replies: Vec<GeneratedText> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Retryable(format!("response timed out after {:?}", self.timeout))
            } else {
                AttemptError::Fatal(format!("malformed response: {}", e))
            }
        })?;

        replies
            .into_iter()
            .next()
            .map(|reply| reply.generated_text)
            .ok_or_else(|| AttemptError::Fatal("response array was empty".to_string()))
    }
}

impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            match self.attempt(prompt).await {
                Ok(text) => {
                    debug!(url = %self.url, attempt, chars = text.len(), "Generation succeeded");
                    return Ok(text);
                }
                Err(AttemptError::Retryable(reason)) if attempt < attempts => {
                    warn!(
                        url = %self.url,
                        attempt,
                        reason = %reason,
                        "Generation failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                    attempt += 1;
                }
                Err(AttemptError::Retryable(reason)) | Err(AttemptError::Fatal(reason)) => {
                    warn!(
                        url = %self.url,
                        attempt,
                        reason = %reason,
                        "Generation service unavailable"
                    );
                    return Err(ExtractionError::UpstreamUnavailable(reason));
                }
            }
        }
    }
}
