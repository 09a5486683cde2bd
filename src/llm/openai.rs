//! OpenAI-compatible chat-completions reasoner.
//!
//! Speaks the `/v1/chat/completions` function-calling dialect over reqwest,
//! so any OpenAI-compatible endpoint can serve as the decision-maker.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::{ChatMessage, Reasoner, Role, ToolCall, ToolDefinition, TurnOutcome};

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// The API delivers arguments as a JSON-encoded string.
    arguments: String,
}

// ── Reasoner ────────────────────────────────────────────────────────

/// Reasoner backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiReasoner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiReasoner {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn role_str(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

#[async_trait::async_trait]
impl Reasoner for OpenAiReasoner {
    async fn respond(
        &self,
        transcript: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<TurnOutcome, LlmError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: transcript
                .iter()
                .map(|m| WireMessage {
                    role: Self::role_str(m.role),
                    content: &m.content,
                    tool_call_id: m.tool_call_id.as_deref(),
                })
                .collect(),
            tools: tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunctionDef {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
            temperature: self.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::InvalidResponse("response had no choices".into()))?;

        if message.tool_calls.is_empty() {
            return Ok(TurnOutcome::Text(message.content.unwrap_or_default()));
        }

        let calls = message
            .tool_calls
            .into_iter()
            .map(|c| {
                let arguments = serde_json::from_str(&c.function.arguments)
                    .map_err(|e| LlmError::InvalidResponse(format!("bad tool arguments: {}", e)))?;
                Ok(ToolCall {
                    id: c.id,
                    name: c.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;

        Ok(TurnOutcome::ToolCalls {
            calls,
            content: message.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization_skips_empty_tools() {
        let request = CompletionRequest {
            model: "gpt-4o",
            messages: vec![WireMessage {
                role: "user",
                content: "hello",
                tool_call_id: None,
            }],
            tools: vec![],
            temperature: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o"));
        assert!(!json.contains("tools"));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("tool_call_id"));
    }

    #[test]
    fn response_with_tool_calls_deserializes() {
        let json = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "set_output",
                            "arguments": "{\"key\": \"emails\", \"value\": \"emails.jsonl\"}"
                        }
                    }]
                }
            }]
        }"#;
        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        let message = &response.choices[0].message;
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls[0].function.name, "set_output");
    }

    #[test]
    fn text_response_deserializes() {
        let json = r#"{"choices":[{"message":{"content":"done"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("done")
        );
        assert!(response.choices[0].message.tool_calls.is_empty());
    }
}
