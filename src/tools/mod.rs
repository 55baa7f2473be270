pub mod drive_thru;

use crate::core::error::DriveThruError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A capability exposed to the model. Tools receive JSON arguments and
/// return a JSON result; domain-level failures come back as clarification
/// messages inside the result, not as errors.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn call(&self, args: Value) -> Result<Value, DriveThruError>;
}

pub struct ToolSet {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.order.push(tool.name().to_string());
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Tools in registration order, for prompt rendering.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).cloned())
            .collect()
    }

    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value, DriveThruError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| DriveThruError::ToolNotFound(name.to_string()))?;
        debug!(tool = name, %args, "dispatching tool call");
        tool.call(args).await
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Scans a model reply for a tool invocation of the form
/// `{"tool": "...", "arguments": {...}}`, either bare, inside a code
/// fence, or embedded in prose. Returns the tool name and its arguments.
pub fn extract_tool_call(message: &str) -> Option<(String, Value)> {
    let pattern = r#""tool"\s*:\s*"([^"]+)""#;
    let re = regex::Regex::new(pattern).expect("static pattern");
    let name = re.captures(message)?.get(1)?.as_str().to_string();

    // whole message as JSON first, then fenced blocks, then the outermost
    // brace span
    let parsed: Value = serde_json::from_str(message.trim())
        .ok()
        .or_else(|| fenced_json(message))
        .or_else(|| brace_span_json(message))
        .unwrap_or_else(|| serde_json::json!({}));

    let args = parsed
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    Some((name, args))
}

fn fenced_json(message: &str) -> Option<Value> {
    let start = message.find("```")?;
    let body_start = match message[start..].strip_prefix("```json") {
        Some(_) => start + 7,
        None => start + 3,
    };
    let end = message[body_start..].find("```")? + body_start;
    serde_json::from_str(message[body_start..end].trim()).ok()
}

fn brace_span_json(message: &str) -> Option<Value> {
    let start = message.find('{')?;
    let end = message.rfind('}')?;
    serde_json::from_str(&message[start..=end]).ok()
}
