use async_trait::async_trait;
use serde_json::{json, Value};

use super::error::ToolError;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name of the tool.
    fn name(&self) -> String;

    /// Provides a description of what the tool does and when to use it.
    fn description(&self) -> String;

    /// Parameters for OpenAI-like function calls.
    ///
    /// Implementations return a JSON schema like this one:
    /// ```json
    /// {
    ///     "type": "object",
    ///     "properties": {
    ///         "path": {
    ///             "type": "string",
    ///             "description": "Absolute path to list"
    ///         }
    ///     },
    ///     "required": ["path"]
    /// }
    /// ```
    ///
    /// The default wraps `description()` as a single string input.
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
                "properties": {
                "input": {
                    "type": "string",
                    "description":self.description()
                }
            },
            "required": ["input"]
        })
    }

    /// Processes an input string and executes the tool's functionality.
    ///
    /// This function utilizes `parse_input` to parse the input and then calls `run`.
    /// It is what the agent layer invokes.
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let input = self.parse_input(input).await;
        self.run(input).await
    }

    /// Executes the core functionality of the tool.
    async fn run(&self, input: Value) -> Result<String, ToolError>;

    /// Parses the input string, which could be a JSON value or a raw string, depending on the LLM model.
    ///
    /// Implement this function to extract the parameters needed for your tool. If a simple
    /// string is sufficient, the default implementation can be used.
    async fn parse_input(&self, input: &str) -> Value {
        log::debug!("Using default input parsing for {}: {}", self.name(), input);
        match serde_json::from_str::<Value>(input) {
            Ok(input) => match input.get("input").and_then(Value::as_str) {
                Some(s) => Value::String(s.to_string()),
                None => Value::String(input.to_string()),
            },
            Err(_) => Value::String(input.to_string()),
        }
    }
}
