pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::providers::{LLMProvider, Message};
use crate::tools::drive_thru::SessionState;
pub use dispatcher::create_command_registry;

/// Mutable state threaded through the chat loop and the slash commands.
pub struct ChatState {
    pub messages: Vec<Message>,
    pub provider: Box<dyn LLMProvider>,
    pub model: String,
    pub session: SessionState,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(
        provider: Box<dyn LLMProvider>,
        model: &str,
        system_prompt: String,
        session: SessionState,
    ) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            provider,
            model: model.to_string(),
            session,
            should_continue: true,
        }
    }
}
