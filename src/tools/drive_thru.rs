use crate::core::error::DriveThruError;
use crate::menu::{ItemSize, Lookup, MenuCatalog, MenuItem, format_price};
use crate::order::{Order, OrderError};
use crate::tools::{Tool, ToolSet};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared session state handed to every tool: the loaded catalog and the
/// customer's single order. Explicit objects, not globals.
#[derive(Clone)]
pub struct SessionState {
    pub catalog: Arc<MenuCatalog>,
    pub order: Arc<Mutex<Order>>,
}

impl SessionState {
    pub fn new(catalog: Arc<MenuCatalog>) -> Self {
        Self {
            catalog,
            order: Arc::new(Mutex::new(Order::new())),
        }
    }

    fn lock_order(&self) -> Result<MutexGuard<'_, Order>, DriveThruError> {
        self.order
            .lock()
            .map_err(|_| DriveThruError::ToolExecution("order state poisoned".to_string()))
    }
}

/// Registers the full drive-thru capability surface on a fresh tool set.
pub fn drive_thru_tools(state: SessionState) -> ToolSet {
    let mut tools = ToolSet::new();
    tools.add_tool(Arc::new(ShowMenuTool {
        state: state.clone(),
    }));
    tools.add_tool(Arc::new(AddToOrderTool {
        state: state.clone(),
    }));
    tools.add_tool(Arc::new(UpdateOrderLineTool {
        state: state.clone(),
    }));
    tools.add_tool(Arc::new(RemoveFromOrderTool {
        state: state.clone(),
    }));
    tools.add_tool(Arc::new(ShowOrderTool {
        state: state.clone(),
    }));
    tools.add_tool(Arc::new(CheckoutTool { state }));
    tools
}

fn message(text: impl Into<String>) -> Value {
    json!({ "message": text.into() })
}

fn size_options(item: &MenuItem) -> String {
    item.sizes
        .iter()
        .map(|opt| opt.size.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns a recoverable order error into customer-facing wording.
fn order_error_message(err: OrderError) -> Value {
    match err {
        OrderError::OrderClosed | OrderError::AlreadyCheckedOut => message(
            "This order has already been checked out. Please start a new session for another order.",
        ),
        OrderError::EmptyOrder => message("The order is empty, there is nothing to check out yet."),
        OrderError::InvalidQuantity => message("The quantity has to be at least 1."),
        OrderError::InvalidSize { item, size } => {
            message(format!("'{}' is not a size we offer for {}.", size, item))
        }
        OrderError::LineNotFound(id) => message(format!(
            "There is no line #{} in the order. Use show_order to see the current lines.",
            id
        )),
    }
}

struct ShowMenuTool {
    state: SessionState,
}

#[async_trait]
impl Tool for ShowMenuTool {
    fn name(&self) -> &str {
        "show_menu"
    }

    fn description(&self) -> &str {
        "Show the full menu with categories, prices and available sizes"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _args: Value) -> Result<Value, DriveThruError> {
        let menu: Vec<String> = self.state.catalog.describe().collect();
        Ok(json!({ "menu": menu.join("\n") }))
    }
}

#[derive(Deserialize)]
struct AddToOrderArgs {
    item: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    size: Option<String>,
    special_instructions: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

struct AddToOrderTool {
    state: SessionState,
}

#[async_trait]
impl Tool for AddToOrderTool {
    fn name(&self) -> &str {
        "add_to_order"
    }

    fn description(&self) -> &str {
        "Add a menu item to the order by name, with quantity, size and special instructions"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item": { "type": "string", "description": "Menu item name as the customer said it" },
                "quantity": { "type": "integer", "minimum": 1, "default": 1 },
                "size": { "type": "string", "enum": ["small", "medium", "large"] },
                "special_instructions": { "type": "string" }
            },
            "required": ["item"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, DriveThruError> {
        let args: AddToOrderArgs = serde_json::from_value(args)
            .map_err(|e| DriveThruError::ToolExecution(format!("add_to_order args: {}", e)))?;

        let item = match self.state.catalog.find(&args.item) {
            Lookup::Match(item) => item,
            Lookup::Ambiguous(candidates) => {
                let names: Vec<&str> = candidates.iter().map(|i| i.name.as_str()).collect();
                return Ok(message(format!(
                    "A few things on the menu match '{}'. Did you mean: {}?",
                    args.item,
                    names.join(", ")
                )));
            }
            Lookup::NotFound => {
                return Ok(message(format!(
                    "Sorry, I couldn't find '{}' on the menu. Please check the menu and try again.",
                    args.item
                )));
            }
        };

        let size = match &args.size {
            Some(raw) => match ItemSize::parse(raw) {
                Some(size) => Some(size),
                None => {
                    return Ok(message(format!(
                        "'{}' is not a size we offer. Sizes are small, medium and large.",
                        raw
                    )));
                }
            },
            None => {
                if item.has_sizes() {
                    // ask rather than silently defaulting when the customer
                    // named a sized item without a size
                    return Ok(message(format!(
                        "What size would you like for the {}? Available sizes: {}.",
                        item.name,
                        size_options(item)
                    )));
                }
                None
            }
        };

        let mut order = self.state.lock_order()?;
        let (confirmation, line_id) =
            match order.add_item(item, size, args.quantity, args.special_instructions.clone()) {
                Ok(line) => {
                    let size_text = line
                        .size
                        .map(|s| format!(" ({})", s))
                        .unwrap_or_default();
                    (
                        format!(
                            "Added {}x {}{} for {}.",
                            line.quantity,
                            line.item.name,
                            size_text,
                            format_price(line.line_total())
                        ),
                        line.id,
                    )
                }
                Err(err) => return Ok(order_error_message(err)),
            };

        Ok(json!({
            "message": confirmation,
            "line": line_id,
            "order_total": format_price(order.total()),
        }))
    }
}

#[derive(Deserialize)]
struct UpdateOrderLineArgs {
    line: u32,
    quantity: Option<u32>,
    size: Option<String>,
}

struct UpdateOrderLineTool {
    state: SessionState,
}

#[async_trait]
impl Tool for UpdateOrderLineTool {
    fn name(&self) -> &str {
        "update_order_line"
    }

    fn description(&self) -> &str {
        "Change the quantity or size of an existing order line"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "line": { "type": "integer", "description": "Line number from show_order" },
                "quantity": { "type": "integer", "minimum": 1 },
                "size": { "type": "string", "enum": ["small", "medium", "large"] }
            },
            "required": ["line"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, DriveThruError> {
        let args: UpdateOrderLineArgs = serde_json::from_value(args)
            .map_err(|e| DriveThruError::ToolExecution(format!("update_order_line args: {}", e)))?;

        let size = match &args.size {
            Some(raw) => match ItemSize::parse(raw) {
                Some(size) => Some(size),
                None => {
                    return Ok(message(format!(
                        "'{}' is not a size we offer. Sizes are small, medium and large.",
                        raw
                    )));
                }
            },
            None => None,
        };

        let mut order = self.state.lock_order()?;
        let confirmation = match order.update_line(args.line, args.quantity, size) {
            Ok(line) => {
                let size_text = line
                    .size
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default();
                format!(
                    "Line #{} is now {}x {}{} for {}.",
                    line.id,
                    line.quantity,
                    line.item.name,
                    size_text,
                    format_price(line.line_total())
                )
            }
            Err(err) => return Ok(order_error_message(err)),
        };

        Ok(json!({
            "message": confirmation,
            "order_total": format_price(order.total()),
        }))
    }
}

#[derive(Deserialize)]
struct RemoveFromOrderArgs {
    line: Option<u32>,
    item: Option<String>,
}

struct RemoveFromOrderTool {
    state: SessionState,
}

#[async_trait]
impl Tool for RemoveFromOrderTool {
    fn name(&self) -> &str {
        "remove_from_order"
    }

    fn description(&self) -> &str {
        "Remove a line from the order, by line number or by item name"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "line": { "type": "integer", "description": "Line number from show_order" },
                "item": { "type": "string", "description": "Item name, used when no line number is given" }
            }
        })
    }

    async fn call(&self, args: Value) -> Result<Value, DriveThruError> {
        let args: RemoveFromOrderArgs = serde_json::from_value(args)
            .map_err(|e| DriveThruError::ToolExecution(format!("remove_from_order args: {}", e)))?;

        let mut order = self.state.lock_order()?;

        let line_id = match (args.line, &args.item) {
            (Some(id), _) => id,
            (None, Some(name)) => {
                let wanted = name.to_lowercase();
                match order
                    .lines()
                    .iter()
                    .find(|line| line.item.name.to_lowercase().contains(&wanted))
                {
                    Some(line) => line.id,
                    None => {
                        return Ok(message(format!(
                            "I couldn't find '{}' in the current order.",
                            name
                        )));
                    }
                }
            }
            (None, None) => {
                return Ok(message(
                    "Tell me which line to remove, by line number or item name.",
                ));
            }
        };

        match order.remove_line(line_id) {
            Ok(removed) => Ok(json!({
                "message": format!("Removed {}x {} from your order.", removed.quantity, removed.item.name),
                "order_total": format_price(order.total()),
            })),
            Err(err) => Ok(order_error_message(err)),
        }
    }
}

struct ShowOrderTool {
    state: SessionState,
}

#[async_trait]
impl Tool for ShowOrderTool {
    fn name(&self) -> &str {
        "show_order"
    }

    fn description(&self) -> &str {
        "Show the current order with line numbers, per-line prices and the running total"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _args: Value) -> Result<Value, DriveThruError> {
        let order = self.state.lock_order()?;
        Ok(json!({ "order": order.summary().render() }))
    }
}

struct CheckoutTool {
    state: SessionState,
}

#[async_trait]
impl Tool for CheckoutTool {
    fn name(&self) -> &str {
        "checkout_order"
    }

    fn description(&self) -> &str {
        "Finalize the order and quote the total; no changes are possible afterwards"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _args: Value) -> Result<Value, DriveThruError> {
        let mut order = self.state.lock_order()?;
        match order.checkout() {
            Ok(total) => Ok(json!({
                "message": format!(
                    "Thank you! Your total is {}. Please pull forward to the next window.",
                    format_price(total)
                ),
            })),
            Err(err) => Ok(order_error_message(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{RawMenuRecord, SizeOption};

    fn test_state() -> SessionState {
        let records = vec![
            RawMenuRecord {
                name: "Big Mac".to_string(),
                category: "Burgers".to_string(),
                price: 599,
                sizes: vec![],
            },
            RawMenuRecord {
                name: "World Famous Fries".to_string(),
                category: "Fries & Sides".to_string(),
                price: 289,
                sizes: vec![
                    SizeOption {
                        size: ItemSize::Small,
                        delta: 0,
                    },
                    SizeOption {
                        size: ItemSize::Large,
                        delta: 40,
                    },
                ],
            },
            RawMenuRecord {
                name: "1% Low Fat Milk Jug".to_string(),
                category: "Beverages".to_string(),
                price: 129,
                sizes: vec![],
            },
            RawMenuRecord {
                name: "Chocolate Low Fat Milk Jug".to_string(),
                category: "Beverages".to_string(),
                price: 149,
                sizes: vec![],
            },
        ];
        SessionState::new(Arc::new(MenuCatalog::from_records(records).unwrap()))
    }

    fn text(result: &Value, key: &str) -> String {
        result[key].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn add_then_show_order() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        let result = tools
            .call_tool("add_to_order", json!({ "item": "big mac", "quantity": 2 }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("2x Big Mac"));
        assert_eq!(text(&result, "order_total"), "$11.98");

        let result = tools.call_tool("show_order", json!({})).await.unwrap();
        assert!(text(&result, "order").contains("Total: $11.98"));
    }

    #[tokio::test]
    async fn sized_item_without_size_asks_for_one() {
        let state = test_state();
        let tools = drive_thru_tools(state.clone());

        let result = tools
            .call_tool("add_to_order", json!({ "item": "fries" }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("What size"));
        assert!(state.lock_order().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_size_is_a_clarification() {
        let state = test_state();
        let tools = drive_thru_tools(state.clone());

        let result = tools
            .call_tool(
                "add_to_order",
                json!({ "item": "fries", "size": "extra-large" }),
            )
            .await
            .unwrap();
        assert!(text(&result, "message").contains("not a size"));
        assert!(state.lock_order().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ambiguous_item_lists_candidates() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        let result = tools
            .call_tool("add_to_order", json!({ "item": "milk jug" }))
            .await
            .unwrap();
        let msg = text(&result, "message");
        assert!(msg.contains("Did you mean"));
        assert!(msg.contains("1% Low Fat Milk Jug"));
        assert!(msg.contains("Chocolate Low Fat Milk Jug"));
    }

    #[tokio::test]
    async fn missing_item_is_reported() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        let result = tools
            .call_tool("add_to_order", json!({ "item": "pizza" }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("couldn't find 'pizza'"));
    }

    #[tokio::test]
    async fn update_and_remove_by_line() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        tools
            .call_tool(
                "add_to_order",
                json!({ "item": "fries", "size": "small" }),
            )
            .await
            .unwrap();

        let result = tools
            .call_tool(
                "update_order_line",
                json!({ "line": 1, "quantity": 3, "size": "large" }),
            )
            .await
            .unwrap();
        assert!(text(&result, "message").contains("3x World Famous Fries (large)"));
        assert_eq!(text(&result, "order_total"), "$9.87");

        let result = tools
            .call_tool("remove_from_order", json!({ "line": 1 }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("Removed"));
        assert_eq!(text(&result, "order_total"), "$0.00");
    }

    #[tokio::test]
    async fn remove_by_name_and_stale_line() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        tools
            .call_tool("add_to_order", json!({ "item": "big mac" }))
            .await
            .unwrap();

        let result = tools
            .call_tool("remove_from_order", json!({ "item": "big mac" }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("Removed"));

        let result = tools
            .call_tool("remove_from_order", json!({ "line": 1 }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("no line #1"));
    }

    #[tokio::test]
    async fn checkout_flow() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        let result = tools.call_tool("checkout_order", json!({})).await.unwrap();
        assert!(text(&result, "message").contains("nothing to check out"));

        tools
            .call_tool("add_to_order", json!({ "item": "big mac" }))
            .await
            .unwrap();

        let result = tools.call_tool("checkout_order", json!({})).await.unwrap();
        assert!(text(&result, "message").contains("$5.99"));

        // the order is closed now
        let result = tools.call_tool("checkout_order", json!({})).await.unwrap();
        assert!(text(&result, "message").contains("already been checked out"));

        let result = tools
            .call_tool("add_to_order", json!({ "item": "big mac" }))
            .await
            .unwrap();
        assert!(text(&result, "message").contains("already been checked out"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let state = test_state();
        let tools = drive_thru_tools(state);

        let err = tools.call_tool("refund_order", json!({})).await.unwrap_err();
        assert!(matches!(err, DriveThruError::ToolNotFound(_)));
    }
}
