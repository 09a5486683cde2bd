//! Decision-maker interface.
//!
//! The node runner drives an opaque reasoning component through the
//! [`Reasoner`] trait: it hands over a transcript and the node's tool
//! definitions, and gets back either assistant text or tagged tool calls.
//! The engine never parses instruction text — prompts are data.

pub mod openai;
pub mod script;

pub use openai::OpenAiReasoner;
pub use script::ScriptedReasoner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Message role in a session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Set on `Tool` messages: which call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Tool metadata exposed to the decision-maker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation chosen by the decision-maker.
///
/// Tagged data, not a dynamic call: the runner validates the name against
/// the node's whitelist before anything executes.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One decision-maker turn — either text or tool calls.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model responded with plain text.
    Text(String),
    /// The model wants to call tools.
    ToolCalls {
        calls: Vec<ToolCall>,
        /// Optional text content alongside the calls.
        content: Option<String>,
    },
}

/// The reasoning capability behind every node session.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Produce the next turn given the transcript so far and the tools the
    /// current node may call.
    async fn respond(
        &self,
        transcript: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<TurnOutcome, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
        let tool = ChatMessage::tool_result("call-1", "ok");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
