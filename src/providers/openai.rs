use crate::core::error::DriveThruError;
use crate::providers::openai_style::OpenAIStyleProvider;
use crate::providers::{LLMProvider, Message};
use async_trait::async_trait;
use futures::stream::BoxStream;

#[derive(Clone)]
pub struct OpenAIProvider {
    inner: OpenAIStyleProvider,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_endpoint("https://api.openai.com/v1".to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            inner: OpenAIStyleProvider::new(endpoint, api_key.unwrap_or_default(), model, None),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
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
