pub mod ollama;
pub mod openai;
pub mod streaming;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{AppConfig, LLMProvider};
use crate::error::AssistantError;
use crate::prompt::CompletionRequest;

/// Fixed so the same input gives the same study material.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub provider: String,
    pub timestamp: String,
}

impl Completion {
    pub fn new(content: String, provider: &str, model: &str) -> Self {
        Self {
            content,
            provider: provider.to_string(),
            model: model.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Receives streamed tokens in arrival order.
pub type TokenSink<'a> = dyn for<'t> FnMut(&'t str) + Send + 'a;

/// Sends one request to a model and returns its text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AssistantError>;

    /// Like `complete`, handing tokens to `on_token` as they arrive.
    /// Providers without streaming deliver the whole text in one call.
    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
        on_token: &mut TokenSink<'_>,
    ) -> Result<Completion, AssistantError> {
        let completion = self.complete(request).await?;
        on_token(&completion.content);
        Ok(completion)
    }

    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Box<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AssistantError> {
        (**self).complete(request).await
    }

    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
        on_token: &mut TokenSink<'_>,
    ) -> Result<Completion, AssistantError> {
        (**self).complete_streaming(request, on_token).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Construct the client for the configured provider.
pub fn build_client(config: &AppConfig) -> Result<Box<dyn CompletionClient>, AssistantError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let client: Box<dyn CompletionClient> = match config.llm_provider {
        LLMProvider::Groq => Box::new(openai::OpenAICompatClient::new(
            "Groq",
            &config.groq_base_url,
            &config.groq_api_key,
            &config.groq_model,
            timeout,
        )?),
        LLMProvider::OpenAI => Box::new(openai::OpenAICompatClient::new(
            "OpenAI",
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
            timeout,
        )?),
        LLMProvider::Ollama => Box::new(ollama::OllamaClient::new(
            &config.ollama_url,
            &config.ollama_model,
            timeout,
        )?),
    };
    log::debug!(
        "Using {} with model {}",
        client.provider_name(),
        config.active_model()
    );
    Ok(client)
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, AssistantError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AssistantError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Classify a non-success HTTP status from a provider.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AssistantError {
    let detail = format!("{} API error ({}): {}", provider, status, body.trim());
    match status {
        StatusCode::TOO_MANY_REQUESTS => AssistantError::RateLimited(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AssistantError::Timeout(detail),
        // Bad key, unknown model or malformed request: resending won't help.
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY => AssistantError::RequestRejected(detail),
        _ => AssistantError::ModelUnavailable(detail),
    }
}

/// Classify a transport failure from reqwest.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AssistantError {
    if err.is_timeout() {
        AssistantError::Timeout(format!("{} request timed out: {}", provider, err))
    } else {
        AssistantError::ModelUnavailable(format!("{} request failed: {}", provider, err))
    }
}
