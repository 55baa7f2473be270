pub mod anthropic;
pub mod base_client;
pub mod factory;
pub mod openai;
pub mod openai_style;
pub mod openrouter;

use crate::core::error::DriveThruError;
use async_trait::async_trait;
use futures::stream::BoxStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    fn clone_provider(&self) -> Box<dyn LLMProvider>;

    async fn get_response(&self, messages: &[Message]) -> Result<String, DriveThruError>;

    async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, DriveThruError>>, DriveThruError>;

    fn set_model(&mut self, model: &str);
}
