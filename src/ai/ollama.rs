use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, status_error, transport_error, Completion, CompletionClient, TEMPERATURE};
use crate::error::AssistantError;
use crate::prompt::{ChatMessage, CompletionRequest};

const PROVIDER: &str = "Ollama";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

pub struct OllamaClient {
    url: String,
    model: String,
    http: Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AssistantError> {
        Ok(Self {
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.to_string(),
            http: http_client(timeout)?,
        })
    }

    fn body(&self, request: &CompletionRequest) -> OllamaRequest<'_> {
        OllamaRequest {
            model: &self.model,
            messages: request.messages(),
            stream: false,
            options: OllamaOptions {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AssistantError> {
        let response = self
            .http
            .post(&self.url)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| match transport_error(PROVIDER, e) {
                AssistantError::ModelUnavailable(msg) => {
                    AssistantError::ModelUnavailable(format!("{}. Is Ollama running?", msg))
                }
                other => other,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(PROVIDER, status, &body);
            log::error!("[{}] {}", request.id, err);
            return Err(err);
        }

        let body: OllamaResponse = response.json().await.map_err(|e| {
            AssistantError::ModelUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        let content = body
            .message
            .map(|m| m.content)
            .ok_or_else(|| AssistantError::ModelUnavailable("No response from Ollama".to_string()))?;

        Ok(Completion::new(content, PROVIDER, &self.model))
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::Mode;
    use crate::prompt::compose;

    #[test]
    fn body_disables_streaming_and_sampling() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url, "http://localhost:11434/api/chat");

        let req = compose(Mode::Chat, "Explain osmosis").unwrap();
        let json = serde_json::to_value(client.body(&req)).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.0);
        assert_eq!(json["messages"][0]["content"], "You're a helpful tutor.");
        assert_eq!(json["messages"][1]["content"], "Explain osmosis");
    }

    #[test]
    fn missing_message_is_none() {
        let body: OllamaResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(body.message.is_none());
    }
}
