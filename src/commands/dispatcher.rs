use super::{
    ChatState,
    handler::{ClearCommand, HelpCommand, MenuCommand, ModelCommand, OrderCommand, QuitCommand},
    registry::CommandRegistry,
};
use crate::core::error::DriveThruError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, DriveThruError> {
        self.registry.execute(command, args, state)
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("model", ModelCommand);
    registry.register("menu", MenuCommand);
    registry.register("order", OrderCommand);

    CommandDispatcher::new(Arc::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DriveThruError;
    use crate::menu::MenuCatalog;
    use crate::providers::{LLMProvider, Message};
    use crate::tools::drive_thru::SessionState;
    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use std::sync::Arc;

    #[derive(Clone)]
    struct NoopProvider;

    #[async_trait]
    impl LLMProvider for NoopProvider {
        fn clone_provider(&self) -> Box<dyn LLMProvider> {
            Box::new(self.clone())
        }

        async fn get_response(&self, _messages: &[Message]) -> Result<String, DriveThruError> {
            Ok(String::new())
        }

        async fn get_response_stream(
            &self,
            _messages: &[Message],
        ) -> Result<BoxStream<'static, Result<String, DriveThruError>>, DriveThruError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        fn set_model(&mut self, _model: &str) {}
    }

    fn test_state() -> ChatState {
        let session = SessionState::new(Arc::new(MenuCatalog::default()));
        ChatState::new(Box::new(NoopProvider), "test-model", "prompt".to_string(), session)
    }

    #[test]
    fn quit_stops_the_loop() {
        let dispatcher = create_command_registry();
        let mut state = test_state();

        dispatcher.execute("quit", &[], &mut state).unwrap();
        assert!(!state.should_continue);
    }

    #[test]
    fn unknown_command_is_an_input_error() {
        let dispatcher = create_command_registry();
        let mut state = test_state();

        let err = dispatcher.execute("refund", &[], &mut state).unwrap_err();
        assert!(matches!(err, DriveThruError::Input(_)));
    }

    #[test]
    fn clear_keeps_the_system_prompt() {
        let dispatcher = create_command_registry();
        let mut state = test_state();
        state.messages.push(Message::user("hi"));
        state.messages.push(Message::assistant("hello"));

        dispatcher.execute("clear", &[], &mut state).unwrap();
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn order_command_reports_empty_order() {
        let dispatcher = create_command_registry();
        let mut state = test_state();

        let output = dispatcher.execute("order", &[], &mut state).unwrap().unwrap();
        assert!(output.contains("empty"));
    }

    #[test]
    fn menu_command_looks_up_single_items() {
        use crate::menu::RawMenuRecord;

        let catalog = MenuCatalog::from_records(vec![RawMenuRecord {
            name: "Big Mac".to_string(),
            category: "Burgers".to_string(),
            price: 599,
            sizes: vec![],
        }])
        .unwrap();
        let session = SessionState::new(Arc::new(catalog));
        let mut state =
            ChatState::new(Box::new(NoopProvider), "test-model", "prompt".to_string(), session);

        let dispatcher = create_command_registry();
        let output = dispatcher
            .execute("menu", &["big", "mac"], &mut state)
            .unwrap()
            .unwrap();
        assert!(output.contains("$5.99"));

        let output = dispatcher
            .execute("menu", &["pizza"], &mut state)
            .unwrap()
            .unwrap();
        assert!(output.contains("not found"));
    }

    #[test]
    fn model_command_shows_and_changes_model() {
        let dispatcher = create_command_registry();
        let mut state = test_state();

        let output = dispatcher.execute("model", &[], &mut state).unwrap().unwrap();
        assert!(output.contains("test-model"));

        let output = dispatcher
            .execute("model", &["gpt-4.1-mini"], &mut state)
            .unwrap()
            .unwrap();
        assert!(output.contains("gpt-4.1-mini"));
        assert_eq!(state.model, "gpt-4.1-mini");
    }
}
