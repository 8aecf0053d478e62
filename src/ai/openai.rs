//! Chat completions client for OpenAI and OpenAI-compatible hosts (Groq).

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::streaming::{SseDecoder, SseEvent};
use super::{
    http_client, status_error, transport_error, Completion, CompletionClient, TokenSink,
    TEMPERATURE,
};
use crate::error::AssistantError;
use crate::prompt::{ChatMessage, CompletionRequest};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

pub struct OpenAICompatClient {
    provider: String,
    endpoint: String,
    api_key: String,
    model: String,
    http: Client,
}

impl OpenAICompatClient {
    pub fn new(
        provider: &str,
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        if api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey(provider.to_string()));
        }

        Ok(Self {
            provider: provider.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: http_client(timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body(&self, request: &CompletionRequest, stream: bool) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.model,
            messages: request.messages(),
            temperature: TEMPERATURE,
            stream,
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, AssistantError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.body(request, stream))
            .send()
            .await
            .map_err(|e| transport_error(&self.provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(&self.provider, status, &body);
            log::error!("[{}] {}", request.id, err);
            return Err(err);
        }

        Ok(response)
    }

    fn consume(
        &self,
        request: &CompletionRequest,
        events: Vec<SseEvent>,
        on_token: &mut TokenSink<'_>,
        full_response: &mut String,
    ) -> Result<(), AssistantError> {
        for event in events {
            match event {
                SseEvent::Token(token) => {
                    on_token(&token);
                    full_response.push_str(&token);
                }
                SseEvent::Done => {}
                SseEvent::Error(message) => {
                    let err = AssistantError::ModelUnavailable(format!(
                        "{} stream error: {}",
                        self.provider, message
                    ));
                    log::error!("[{}] {}", request.id, err);
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AssistantError> {
        let response = self.send(request, false).await?;

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            AssistantError::ModelUnavailable(format!(
                "Failed to parse {} response: {}",
                self.provider, e
            ))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| {
                AssistantError::ModelUnavailable(format!("No response from {}", self.provider))
            })?;

        Ok(Completion::new(content, &self.provider, &self.model))
    }

    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
        on_token: &mut TokenSink<'_>,
    ) -> Result<Completion, AssistantError> {
        let response = self.send(request, true).await?;

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut full_response = String::new();

        while !decoder.is_finished() {
            let Some(chunk) = stream.next().await else {
                let events = decoder.finish_input();
                self.consume(request, events, on_token, &mut full_response)?;
                break;
            };
            let chunk = chunk.map_err(|e| transport_error(&self.provider, e))?;
            let events = decoder.feed(&chunk);
            self.consume(request, events, on_token, &mut full_response)?;
        }

        if !decoder.is_finished() {
            let err = AssistantError::ModelUnavailable(format!(
                "{} stream ended before completion",
                self.provider
            ));
            log::error!("[{}] {}", request.id, err);
            return Err(err);
        }

        Ok(Completion::new(full_response, &self.provider, &self.model))
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }
}
