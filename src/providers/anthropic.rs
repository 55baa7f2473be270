use crate::core::error::DriveThruError;
use crate::providers::base_client::HttpClient;
use crate::providers::{LLMProvider, Message, Role};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Parser for Anthropic's streaming response
pub fn anthropic_stream_parser(data: String) -> Result<Option<String>, DriveThruError> {
    let mut content = String::new();
    for line in data.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            continue;
        }
        let parsed: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(_) => continue,
        };

        if parsed["type"] == "content_block_delta" {
            if let Some(text) = parsed["delta"]["text"].as_str() {
                content.push_str(text);
            }
        } else if parsed["type"] == "error" {
            if let Some(message) = parsed["error"]["message"].as_str() {
                return Err(DriveThruError::Api(format!(
                    "Anthropic stream error: {}",
                    message
                )));
            }
        }
    }

    if content.is_empty() {
        Ok(None)
    } else {
        Ok(Some(content))
    }
}

#[derive(Clone)]
pub struct AnthropicProvider {
    client: HttpClient,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_endpoint("https://api.anthropic.com/v1".to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>, model: String) -> Self {
        let mut extra_headers = HashMap::new();
        extra_headers.insert("anthropic-version".to_string(), "2023-06-01".to_string());
        Self {
            client: HttpClient::new(
                endpoint,
                Some(("x-api-key".to_string(), api_key.unwrap_or_default())),
                Some(extra_headers),
            ),
            model,
        }
    }

    fn build_payload(&self, messages: &[Message], stream: bool) -> AnthropicRequest {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());

        let turns = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| AnthropicMessage {
                role: match m.role {
                    Role::Assistant => "assistant".to_string(),
                    _ => "user".to_string(),
                },
                content: m.content.clone(),
            })
            .collect();

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            messages: turns,
            stream: Some(stream),
            system,
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn clone_provider(&self) -> Box<dyn LLMProvider> {
        Box::new(self.clone())
    }

    async fn get_response(&self, messages: &[Message]) -> Result<String, DriveThruError> {
        let payload = self.build_payload(messages, false);
        let response = self.client.post("messages", &payload).await?;
        let body = response.text().await?;
        let parsed: AnthropicResponse = serde_json::from_str(&body)?;

        parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| DriveThruError::Api("Empty response from Anthropic".to_string()))
    }

    async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, DriveThruError>>, DriveThruError> {
        let payload = self.build_payload(messages, true);
        let response = self.client.post("messages", &payload).await?;
        Ok(self.client.stream_response(response, anthropic_stream_parser))
    }

    fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_parser_extracts_text_deltas() {
        let data = concat!(
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n",
            "data: {\"type\":\"message_stop\"}\n"
        );
        let parsed = anthropic_stream_parser(data.to_string()).unwrap();
        assert_eq!(parsed.as_deref(), Some("Hi"));
    }

    #[test]
    fn stream_parser_propagates_api_errors() {
        let data = "data: {\"type\":\"error\",\"error\":{\"message\":\"overloaded\"}}\n";
        let err = anthropic_stream_parser(data.to_string()).unwrap_err();
        assert!(matches!(err, DriveThruError::Api(_)));
    }
}
