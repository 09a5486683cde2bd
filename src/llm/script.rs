//! Scripted reasoner — a deterministic decision-maker.
//!
//! Plays back a fixed sequence of turns, one per `respond` call, so tests
//! can exercise the scheduling and contract machinery without a live model.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::LlmError;
use crate::llm::{ChatMessage, Reasoner, ToolCall, ToolDefinition, TurnOutcome};

/// Reasoner that replays a pre-built list of turns.
pub struct ScriptedReasoner {
    turns: Mutex<VecDeque<TurnOutcome>>,
}

impl ScriptedReasoner {
    pub fn new(turns: Vec<TurnOutcome>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
        }
    }

    /// Remaining unplayed turns (a finished script should report zero).
    pub fn remaining(&self) -> usize {
        self.turns.lock().expect("script lock").len()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn respond(
        &self,
        _transcript: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<TurnOutcome, LlmError> {
        self.turns
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".into()))
    }
}

/// Build a text turn.
pub fn say(text: impl Into<String>) -> TurnOutcome {
    TurnOutcome::Text(text.into())
}

/// Build a single-tool-call turn.
pub fn call(name: &str, arguments: serde_json::Value) -> TurnOutcome {
    TurnOutcome::ToolCalls {
        calls: vec![ToolCall {
            id: format!("call-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            arguments,
        }],
        content: None,
    }
}

/// Build a `set_output` completion turn.
pub fn set_output(key: &str, value: &str) -> TurnOutcome {
    call("set_output", json!({ "key": key, "value": value }))
}
