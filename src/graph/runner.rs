//! Node runner — drives one node's decision-maker session to completion.
//!
//! State machine per invocation:
//! `AwaitingInput → Reasoning → (ToolCall ⇄ Reasoning)* → Completing → Done`.
//!
//! The runner owns the session transcript. Tool calls go through the
//! gateway; the completion action `set_output` is synthetic and handled
//! here, never dispatched. Client-facing nodes additionally converse over
//! the client channel and may not complete until the user confirms.

use std::sync::Arc;

use crate::channels::ClientChannel;
use crate::context::RunContext;
use crate::error::{ChannelError, Error, NodeError, Result, ToolError};
use crate::graph::spec::NodeSpec;
use crate::graph::state::StateStore;
use crate::llm::{ChatMessage, Reasoner, ToolCall, ToolDefinition, TurnOutcome};
use crate::tools::ToolGateway;

/// Where a node session currently is. Used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    AwaitingInput,
    Reasoning,
    ToolCall,
    Completing,
    Done,
}

/// The synthetic completion action — the only way a node writes the state store.
pub const SET_OUTPUT: &str = "set_output";

fn set_output_definition(output_keys: &[String]) -> ToolDefinition {
    ToolDefinition {
        name: SET_OUTPUT.to_string(),
        description: format!(
            "Record an output value for this step. Call once per declared output key. \
             Declared keys: {}.",
            output_keys.join(", ")
        ),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "key": {"type": "string", "description": "The output key to set"},
                "value": {"type": "string", "description": "The value to record"}
            },
            "required": ["key", "value"]
        }),
    }
}

/// Runs node sessions against a reasoner, gateway, and optional client channel.
pub struct NodeRunner {
    reasoner: Arc<dyn Reasoner>,
    gateway: Arc<ToolGateway>,
    channel: Option<Arc<dyn ClientChannel>>,
    max_iterations: usize,
}

impl NodeRunner {
    pub fn new(
        reasoner: Arc<dyn Reasoner>,
        gateway: Arc<ToolGateway>,
        channel: Option<Arc<dyn ClientChannel>>,
        max_iterations: usize,
    ) -> Self {
        Self {
            reasoner,
            gateway,
            channel,
            max_iterations,
        }
    }

    /// Run one node to `Done`, mutating the state store through its
    /// completion actions.
    pub async fn run(
        &self,
        spec: &NodeSpec,
        state: &mut StateStore,
        ctx: &RunContext,
    ) -> Result<()> {
        let mut phase = NodePhase::AwaitingInput;
        tracing::info!(node_id = %spec.id, ?phase, "Node starting");

        // Assert declared inputs exist before anything else runs.
        for key in &spec.input_keys {
            if !state.contains(key) {
                return Err(NodeError::MissingInput {
                    node_id: spec.id.clone(),
                    key: key.clone(),
                }
                .into());
            }
        }

        let mut transcript = vec![
            ChatMessage::system(&spec.system_prompt),
            ChatMessage::user(input_context(spec, state)),
        ];

        let mut tools = self.gateway.definitions_for_node(spec).await;
        tools.push(set_output_definition(&spec.output_keys));

        // Client-facing completion gate: no set_output until confirmed.
        let mut confirmed = !spec.client_facing;
        let mut outputs_set: Vec<String> = Vec::new();

        for iteration in 0..self.max_iterations {
            phase = NodePhase::Reasoning;
            tracing::debug!(node_id = %spec.id, iteration, ?phase, "Requesting next turn");

            let turn = self
                .reasoner
                .respond(&transcript, &tools)
                .await
                .map_err(Error::Llm)?;

            match turn {
                TurnOutcome::Text(text) => {
                    transcript.push(ChatMessage::assistant(&text));
                    if spec.client_facing && !confirmed {
                        confirmed = self.exchange_with_client(spec, &text, &mut transcript).await?;
                    } else {
                        // Headless nodes only make progress through tool
                        // calls; remind the session what is still owed.
                        let missing = missing_outputs(spec, &outputs_set);
                        transcript.push(ChatMessage::user(format!(
                            "Continue. Outputs still required: {}.",
                            missing.join(", ")
                        )));
                    }
                }
                TurnOutcome::ToolCalls { calls, content } => {
                    phase = NodePhase::ToolCall;
                    tracing::trace!(node_id = %spec.id, ?phase, calls = calls.len(), "Dispatching calls");
                    transcript.push(ChatMessage::assistant(
                        content.unwrap_or_else(|| describe_calls(&calls)),
                    ));

                    for call in calls {
                        if call.name == SET_OUTPUT {
                            phase = NodePhase::Completing;
                            tracing::trace!(node_id = %spec.id, ?phase, "Completion action");
                            self.handle_set_output(
                                spec,
                                state,
                                &call,
                                confirmed,
                                &mut outputs_set,
                                &mut transcript,
                            )?;
                        } else {
                            self.handle_tool_call(spec, ctx, &call, &mut transcript)
                                .await?;
                        }
                    }
                }
            }

            if outputs_set.len() == spec.output_keys.len() {
                phase = NodePhase::Done;
                tracing::info!(node_id = %spec.id, iterations = iteration + 1, ?phase, "Node done");
                return Ok(());
            }
        }

        // Budget exhausted. Partial completion names the first missing key;
        // a session that produced nothing at all is reported as exhausted.
        if outputs_set.is_empty() {
            Err(NodeError::BudgetExhausted {
                node_id: spec.id.clone(),
                budget: self.max_iterations,
            }
            .into())
        } else {
            let missing = missing_outputs(spec, &outputs_set);
            Err(NodeError::IncompleteOutput {
                node_id: spec.id.clone(),
                key: missing[0].clone(),
            }
            .into())
        }
    }

    /// Show the assistant's message to the user and wait for their verdict.
    async fn exchange_with_client(
        &self,
        spec: &NodeSpec,
        text: &str,
        transcript: &mut Vec<ChatMessage>,
    ) -> Result<bool> {
        let channel = self
            .channel
            .as_ref()
            .ok_or(Error::Channel(ChannelError::Closed))?;

        channel.send_message(text).await.map_err(Error::Channel)?;
        let confirmed = channel.await_confirmation().await.map_err(Error::Channel)?;

        if confirmed {
            tracing::info!(node_id = %spec.id, "User confirmed");
            transcript.push(ChatMessage::user(
                "The user confirmed. Record your outputs with set_output now.",
            ));
            Ok(true)
        } else {
            Err(NodeError::ConfirmationDenied {
                node_id: spec.id.clone(),
            }
            .into())
        }
    }

    /// Apply one `set_output` completion action.
    fn handle_set_output(
        &self,
        spec: &NodeSpec,
        state: &mut StateStore,
        call: &ToolCall,
        confirmed: bool,
        outputs_set: &mut Vec<String>,
        transcript: &mut Vec<ChatMessage>,
    ) -> Result<()> {
        let key = call
            .arguments
            .get("key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::Tool(ToolError::InvalidParameters {
                    tool: SET_OUTPUT.to_string(),
                    reason: "missing or non-string parameter 'key'".to_string(),
                })
            })?
            .to_string();

        // Values are strings in the ledger; non-string JSON is serialized.
        let value = match call.arguments.get("value") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => {
                return Err(Error::Tool(ToolError::InvalidParameters {
                    tool: SET_OUTPUT.to_string(),
                    reason: "missing parameter 'value'".to_string(),
                }));
            }
        };

        if !spec.output_keys.contains(&key) {
            return Err(NodeError::UndeclaredOutput {
                node_id: spec.id.clone(),
                key,
            }
            .into());
        }

        if !confirmed {
            // Not fatal: the session is told to finish the exchange first.
            transcript.push(ChatMessage::tool_result(
                call.id.clone(),
                "error: user confirmation is required before outputs can be recorded",
            ));
            return Ok(());
        }

        state.set_output(&spec.id, &key, &value)?;
        outputs_set.push(key.clone());
        tracing::debug!(node_id = %spec.id, key = %key, "Output recorded");
        transcript.push(ChatMessage::tool_result(
            call.id.clone(),
            serde_json::json!({"ok": true, "key": key}).to_string(),
        ));
        Ok(())
    }

    /// Dispatch one real tool call through the gateway.
    ///
    /// Policy violations and unknown tools abort the run. Execution and
    /// parameter failures are fed back into the transcript so the session
    /// may retry with corrected arguments — the engine itself never retries.
    async fn handle_tool_call(
        &self,
        spec: &NodeSpec,
        ctx: &RunContext,
        call: &ToolCall,
        transcript: &mut Vec<ChatMessage>,
    ) -> Result<()> {
        match self
            .gateway
            .invoke(spec, &call.name, call.arguments.clone(), ctx)
            .await
        {
            Ok(output) => {
                transcript.push(ChatMessage::tool_result(
                    call.id.clone(),
                    output.result.to_string(),
                ));
                Ok(())
            }
            Err(err @ ToolError::NotPermitted { .. }) => Err(err.into()),
            Err(err @ ToolError::NotFound(_)) => Err(err.into()),
            Err(err) => {
                tracing::warn!(node_id = %spec.id, tool = %call.name, error = %err, "Tool call failed");
                transcript.push(ChatMessage::tool_result(
                    call.id.clone(),
                    format!("error: {}", err),
                ));
                Ok(())
            }
        }
    }
}

/// Render the node's declared inputs as the opening user message.
fn input_context(spec: &NodeSpec, state: &StateStore) -> String {
    let mut lines = vec!["Input context:".to_string()];
    for key in &spec.input_keys {
        // Presence was asserted before the transcript was built.
        let value = state.get(key).unwrap_or_default();
        lines.push(format!("{}: {}", key, value));
    }
    lines.join("\n")
}

fn missing_outputs(spec: &NodeSpec, outputs_set: &[String]) -> Vec<String> {
    spec.output_keys
        .iter()
        .filter(|k| !outputs_set.contains(k))
        .cloned()
        .collect()
}

fn describe_calls(calls: &[ToolCall]) -> String {
    let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
    format!("[calling {}]", names.join(", "))
}
