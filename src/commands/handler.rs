use super::ChatState;
use crate::core::error::DriveThruError;
use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, DriveThruError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct ModelCommand;
pub struct MenuCommand;
pub struct OrderCommand;

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, DriveThruError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Leave the drive-thru"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, DriveThruError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = vec![
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            ModelCommand.help().to_string(),
            MenuCommand.help().to_string(),
            OrderCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, DriveThruError> {
        // keep the system prompt, drop the conversation
        state.messages.truncate(1);
        Ok(Some("Conversation cleared. Your order is untouched.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Clear the conversation (keeps the order)"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, DriveThruError> {
        if args.is_empty() {
            Ok(Some(format!("Current model: {}", state.model)))
        } else {
            let new_model = args[0].to_string();
            state.provider.set_model(&new_model);
            state.model = new_model;
            Ok(Some(format!("Model changed to: {}", state.model)))
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

impl CommandHandler for MenuCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, DriveThruError> {
        if args.is_empty() {
            let menu: Vec<String> = state.session.catalog.describe().collect();
            return Ok(Some(menu.join("\n")));
        }

        // `/menu big mac` prints one item
        let query = args.join(" ");
        match state.session.catalog.require(&query) {
            Ok(item) => {
                let mut line = format!(
                    "{} ({}) - {}",
                    item.name,
                    item.category,
                    crate::menu::format_price(item.price)
                );
                if item.has_sizes() {
                    let sizes: Vec<String> =
                        item.sizes.iter().map(|opt| opt.size.to_string()).collect();
                    line.push_str(&format!(" [{}]", sizes.join(", ")));
                }
                Ok(Some(line))
            }
            Err(e) => Ok(Some(e.to_string())),
        }
    }

    fn help(&self) -> &'static str {
        "/menu [item] - Print the menu, or look up a single item"
    }
}

impl CommandHandler for OrderCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, DriveThruError> {
        let order = state
            .session
            .order
            .lock()
            .map_err(|_| DriveThruError::Input("order state poisoned".to_string()))?;
        Ok(Some(order.summary().render()))
    }

    fn help(&self) -> &'static str {
        "/order - Print the current order and total"
    }
}
