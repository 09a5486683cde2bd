//! The Tool trait and helpers shared by implementations.

use std::time::Duration;

use async_trait::async_trait;

use crate::context::RunContext;
use crate::error::ToolError;
use crate::llm::ToolDefinition;

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Structured result, fed back into the session transcript as JSON.
    pub result: serde_json::Value,
    /// How long execution took.
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }
}

/// A callable capability exposed to the decision-maker.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool identifier as referenced by node whitelists.
    fn name(&self) -> &str;

    /// Human-readable description passed to the decision-maker.
    fn description(&self) -> &str;

    /// JSON schema of the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute with validated-against-schema best effort; implementations
    /// must re-check required parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError>;

    /// Definition handed to the decision-maker for this tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Extract a required string parameter.
pub fn require_str<'a>(
    params: &'a serde_json::Value,
    tool: &str,
    key: &str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters {
            tool: tool.to_string(),
            reason: format!("missing or non-string parameter '{}'", key),
        })
}

/// Extract an optional array-of-strings parameter (absent ⇒ empty).
pub fn optional_str_array(
    params: &serde_json::Value,
    tool: &str,
    key: &str,
) -> Result<Vec<String>, ToolError> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| ToolError::InvalidParameters {
                        tool: tool.to_string(),
                        reason: format!("parameter '{}' must be an array of strings", key),
                    })
            })
            .collect(),
        Some(_) => Err(ToolError::InvalidParameters {
            tool: tool.to_string(),
            reason: format!("parameter '{}' must be an array of strings", key),
        }),
    }
}

/// Extract a required array-of-strings parameter.
pub fn require_str_array(
    params: &serde_json::Value,
    tool: &str,
    key: &str,
) -> Result<Vec<String>, ToolError> {
    if params.get(key).is_none() {
        return Err(ToolError::InvalidParameters {
            tool: tool.to_string(),
            reason: format!("missing parameter '{}'", key),
        });
    }
    optional_str_array(params, tool, key)
}
