use crate::core::error::DriveThruError;
use crate::providers::base_client::HttpClient;
use crate::providers::{Message, Role};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Parser for OpenAI-compatible SSE streams.
pub fn openai_stream_parser(data: String) -> Result<Option<String>, DriveThruError> {
    let mut content = String::new();
    for line in data.lines() {
        if let Some(payload) = line.strip_prefix("data:") {
            let payload = payload.trim();
            if payload.is_empty() || payload == "[DONE]" {
                continue;
            }
            if let Ok(parsed) = serde_json::from_str::<StreamResponse>(payload) {
                if let Some(chunk) = parsed
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.as_deref())
                {
                    content.push_str(chunk);
                }
            }
        }
    }

    if content.is_empty() {
        Ok(None)
    } else {
        Ok(Some(content))
    }
}

/// Shared implementation for every provider speaking the OpenAI
/// chat-completions dialect.
#[derive(Clone)]
pub struct OpenAIStyleProvider {
    client: HttpClient,
    pub model: String,
}

impl OpenAIStyleProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            client: HttpClient::new(
                base_url,
                Some(("Authorization".to_string(), format!("Bearer {}", api_key))),
                extra_headers,
            ),
            model,
        }
    }

    fn request_messages(messages: &[Message]) -> Vec<ChatCompletionMessage> {
        messages
            .iter()
            .map(|m| ChatCompletionMessage {
                role: match m.role {
                    Role::System => "system".to_string(),
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            })
            .collect()
    }

    pub async fn get_response(&self, messages: &[Message]) -> Result<String, DriveThruError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::request_messages(messages),
            stream: None,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| DriveThruError::Api("No choices in API response".to_string()))?;

        if content.is_empty() {
            return Err(DriveThruError::Api("Empty response from API".to_string()));
        }

        Ok(content)
    }

    pub async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, DriveThruError>>, DriveThruError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::request_messages(messages),
            stream: Some(true),
        };

        let response = self.client.post("chat/completions", &payload).await?;
        Ok(self.client.stream_response(response, openai_stream_parser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_parser_collects_deltas() {
        let data = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Wel\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"come\"}}]}\n",
            "data: [DONE]\n"
        );
        let parsed = openai_stream_parser(data.to_string()).unwrap();
        assert_eq!(parsed.as_deref(), Some("Welcome"));
    }

    #[test]
    fn stream_parser_skips_empty_chunks() {
        let parsed = openai_stream_parser("data: [DONE]\n".to_string()).unwrap();
        assert!(parsed.is_none());
    }
}
