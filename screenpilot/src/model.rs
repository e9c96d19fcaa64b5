//! Vision-model collaborator interface and the OpenAI-compatible client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AgentConfig;
use crate::errors::AgentError;
use crate::prompt::ModelRequest;

/// The external vision-model collaborator: one request in, unstructured text
/// out. Failures surface as [`AgentError::ModelUnavailable`], never as
/// partial text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<String, AgentError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiVision {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiVision {
    /// Build a client from explicit configuration. The request timeout is
    /// enforced here so a stalled backend becomes `ModelUnavailable` instead
    /// of hanging the cycle.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        if config.api_key.is_empty() {
            return Err(AgentError::InvalidArgument(
                "vision model API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AgentError::InvalidArgument(format!("cannot build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &ModelRequest) -> Result<String, AgentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::ModelUnavailable(format!("request timed out: {e}"))
                } else {
                    AgentError::ModelUnavailable(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelUnavailable(format!(
                "backend returned {status}: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AgentError::ModelUnavailable(format!("malformed completion response: {e}"))
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AgentError::ModelUnavailable("completion contained no message content".to_string())
            })?;

        debug!(chars = text.len(), "model response received");
        Ok(text)
    }
}
