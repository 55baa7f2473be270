use crate::cli::Args;
use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::core::error::DriveThruError;
use crate::display;
use crate::input;
use crate::providers::{LLMProvider, Message};
use crate::tools::drive_thru::{SessionState, drive_thru_tools};
use crate::tools::{ToolSet, extract_tool_call};
use console::style;
use futures::StreamExt;
use is_terminal::IsTerminal;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a friendly drive-thru assistant taking food orders. \
Help the customer order from the menu using your tools. Always be polite and brief. \
If something is not on the menu, say so instead of inventing items. \
When a tool asks a clarifying question (size, ambiguous item), relay it to the customer. \
When confirming the order, repeat it back with prices. \
Never make up prices; they come from the tools.";

pub struct Application {
    pub args: Args,
    pub provider: Box<dyn LLMProvider>,
    pub command_dispatcher: CommandDispatcher,
    pub session: SessionState,
    pub menu_source: &'static str,
}

impl Application {
    pub fn new(
        args: Args,
        provider: Box<dyn LLMProvider>,
        command_dispatcher: CommandDispatcher,
        session: SessionState,
        menu_source: &'static str,
    ) -> Self {
        Self {
            args,
            provider,
            command_dispatcher,
            session,
            menu_source,
        }
    }

    pub async fn run(&mut self) -> Result<(), DriveThruError> {
        let tool_set = drive_thru_tools(self.session.clone());

        let piped = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| DriveThruError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer.trim().to_string()).filter(|s| !s.is_empty())
        } else {
            None
        };

        let mut state = ChatState::new(
            self.provider.clone_provider(),
            self.args.model.as_deref().unwrap_or_default(),
            system_prompt(&tool_set),
            self.session.clone(),
        );

        match (self.args.query.clone(), piped) {
            (Some(query), None) | (None, Some(query)) => {
                self.run_one_shot(&mut state, &tool_set, query).await
            }
            (Some(query), Some(context)) => {
                let combined = format!("{}\n\n{}", context, query);
                self.run_one_shot(&mut state, &tool_set, combined).await
            }
            (None, None) => self.run_interactive(&mut state, &tool_set).await,
        }
    }

    /// Single exchange: one request, tool turns included, then exit.
    async fn run_one_shot(
        &self,
        state: &mut ChatState,
        tool_set: &ToolSet,
        query: String,
    ) -> Result<(), DriveThruError> {
        state.messages.push(Message::user(query));
        let response = self.converse(state, tool_set, false).await?;

        if response.contains('*') || response.contains('#') || response.contains('`') {
            display::display_markdown(&response);
        } else {
            display::display_response(&response);
        }

        Ok(())
    }

    async fn run_interactive(
        &self,
        state: &mut ChatState,
        tool_set: &ToolSet,
    ) -> Result<(), DriveThruError> {
        display::display_welcome(self.session.catalog.len(), self.menu_source);

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            let line = line.trim().to_string();

            if line.is_empty() {
                continue;
            }

            if let Some(command_line) = line.strip_prefix('/') {
                let parts: Vec<&str> = command_line.split_whitespace().collect();
                if let Some((command, args)) = parts.split_first() {
                    match self.command_dispatcher.execute(command, args, state) {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => display::display_error(&e.to_string()),
                    }

                    if !state.should_continue {
                        break;
                    }
                }
                continue;
            }

            state.messages.push(Message::user(line));
            if let Err(e) = self.converse(state, tool_set, true).await {
                // API hiccups should not kill the session
                display::display_error(&e.to_string());
            }
        }

        input::save_history(&mut editor)?;

        Ok(())
    }

    /// Runs model turns until the reply carries no tool call, feeding each
    /// tool result back into the conversation. Returns the final reply.
    async fn converse(
        &self,
        state: &mut ChatState,
        tool_set: &ToolSet,
        stream: bool,
    ) -> Result<String, DriveThruError> {
        // cap on consecutive tool turns
        const MAX_TOOL_TURNS: usize = 8;

        let mut response = self.generate_response(state, stream).await?;
        state.messages.push(Message::assistant(response.clone()));

        let mut turns = 0;
        while let Some((name, args)) = extract_tool_call(&response) {
            turns += 1;
            if turns > MAX_TOOL_TURNS {
                warn!("tool turn limit reached, returning last reply");
                break;
            }
            println!("{}", style(format!("  [{}]", name)).dim());

            let tool_message = match tool_set.call_tool(&name, args).await {
                Ok(result) => {
                    debug!(tool = %name, "tool call succeeded");
                    format!("Tool result: {}", result)
                }
                Err(e) => {
                    warn!(tool = %name, error = %e, "tool call failed");
                    format!("Tool call failed: {}", e)
                }
            };
            state.messages.push(Message::user(tool_message));

            response = self.generate_response(state, stream).await?;
            state.messages.push(Message::assistant(response.clone()));
        }

        Ok(response)
    }

    /// One model turn. In streaming mode chunks are printed as they
    /// arrive, except for tool-call replies which are kept off the screen.
    async fn generate_response(
        &self,
        state: &mut ChatState,
        stream: bool,
    ) -> Result<String, DriveThruError> {
        if !stream {
            return state.provider.get_response(&state.messages).await;
        }

        let mut chunks = state.provider.get_response_stream(&state.messages).await?;
        let mut full_response = String::new();
        let mut printing = true;

        while let Some(chunk_result) = chunks.next().await {
            let chunk = chunk_result?;
            full_response.push_str(&chunk);

            // a reply that opens with JSON is a tool call, not customer text
            if printing && full_response.trim_start().starts_with('{') {
                printing = false;
            }
            if printing {
                print!("{}", chunk);
                io::stdout().flush()?;
            }
        }

        if printing && !full_response.is_empty() {
            if !full_response.ends_with('\n') {
                println!();
            }
        }

        Ok(full_response)
    }
}

/// Persona plus the tool-calling contract, rendered from the registered
/// tools so prompt and capability surface cannot drift apart.
fn system_prompt(tool_set: &ToolSet) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\nYou have access to the following tools:\n");
    for tool in tool_set.tools() {
        prompt.push_str(&format!(
            "- {}: {}\n  parameters: {}\n",
            tool.name(),
            tool.description(),
            tool.parameters_schema()
        ));
    }
    prompt.push_str(
        "\nTo use a tool, reply with ONLY a JSON object:\n\
        {\n  \"tool\": \"tool_name\",\n  \"arguments\": { ... }\n}\n\
        After a tool result comes back, answer the customer in plain text.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuCatalog;
    use std::sync::Arc;

    #[test]
    fn system_prompt_lists_every_tool() {
        let session = SessionState::new(Arc::new(MenuCatalog::default()));
        let tools = drive_thru_tools(session);
        let prompt = system_prompt(&tools);

        for name in [
            "show_menu",
            "add_to_order",
            "update_order_line",
            "remove_from_order",
            "show_order",
            "checkout_order",
        ] {
            assert!(prompt.contains(name), "prompt is missing {}", name);
        }
    }
}
