use crate::core::error::DriveThruError;
use crate::providers::openai_style::OpenAIStyleProvider;
use crate::providers::{LLMProvider, Message};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;

#[derive(Clone)]
pub struct OpenRouterProvider {
    inner: OpenAIStyleProvider,
}

impl OpenRouterProvider {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_endpoint("https://openrouter.ai/api/v1".to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>, model: String) -> Self {
        let mut extra_headers = HashMap::new();
        extra_headers.insert(
            "X-Title".to_string(),
            "drivethru".to_string(),
        );
        Self {
            inner: OpenAIStyleProvider::new(
                endpoint,
                api_key.unwrap_or_default(),
                model,
                Some(extra_headers),
            ),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    fn clone_provider(&self) -> Box<dyn LLMProvider> {
        Box::new(self.clone())
    }

    async fn get_response(&self, messages: &[Message]) -> Result<String, DriveThruError> {
        self.inner.get_response(messages).await
    }

    async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, DriveThruError>>, DriveThruError> {
        self.inner.get_response_stream(messages).await
    }

    fn set_model(&mut self, model: &str) {
        self.inner.model = model.to_string();
    }
}
