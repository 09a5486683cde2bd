//! Gmail-side tools.
//!
//! Thin adapters between the tool interface and the [`GmailApi`] trait.
//! `bulk_fetch_emails` is the only one that touches the paged store: it
//! writes the fetched batch as JSONL and returns the filename handle, so
//! bulk data never flows through the state store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RunContext;
use crate::error::ToolError;
use crate::mail::GmailApi;
use crate::store::PagedStore;
use crate::tools::tool::{
    Tool, ToolOutput, optional_str_array, require_str, require_str_array,
};

/// Filename handle for a fetched email batch.
pub const EMAILS_FILE: &str = "emails.jsonl";

// ── BulkFetchEmailsTool ─────────────────────────────────────────────

/// Fetch a batch of inbox emails and write them to a paged record file.
pub struct BulkFetchEmailsTool {
    gmail: Arc<dyn GmailApi>,
}

impl BulkFetchEmailsTool {
    pub fn new(gmail: Arc<dyn GmailApi>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for BulkFetchEmailsTool {
    fn name(&self) -> &str {
        "bulk_fetch_emails"
    }

    fn description(&self) -> &str {
        "Fetch up to max_emails from the Gmail inbox and write them as JSONL to a local \
         file. Returns {filename, count} — read the file with load_data."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "max_emails": {
                    "type": "integer",
                    "description": "Maximum number of emails to fetch"
                }
            },
            "required": ["max_emails"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        // Accept both an integer and the string-encoded form seeds use.
        let max_emails = match params.get("max_emails") {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ToolError::InvalidParameters {
            tool: self.name().to_string(),
            reason: "missing or non-integer parameter 'max_emails'".to_string(),
        })? as usize;

        let start = std::time::Instant::now();
        let emails = self.gmail.fetch_inbox(max_emails).await?;

        let store = PagedStore::new(ctx.data_dir.clone());
        for email in &emails {
            let record = serde_json::to_value(email).map_err(|e| ToolError::ExecutionFailed {
                tool: self.name().to_string(),
                reason: e.to_string(),
            })?;
            store
                .append(EMAILS_FILE, &record)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool: self.name().to_string(),
                    reason: e.to_string(),
                })?;
        }

        tracing::info!(count = emails.len(), filename = EMAILS_FILE, "Fetched email batch");
        let result = serde_json::json!({
            "filename": EMAILS_FILE,
            "count": emails.len(),
        });
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

// ── BatchModifyTool ─────────────────────────────────────────────────

/// Modify labels on a batch of messages in one external call.
pub struct BatchModifyTool {
    gmail: Arc<dyn GmailApi>,
}

impl BatchModifyTool {
    pub fn new(gmail: Arc<dyn GmailApi>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for BatchModifyTool {
    fn name(&self) -> &str {
        "gmail_batch_modify_messages"
    }

    fn description(&self) -> &str {
        "Add and/or remove Gmail labels on a batch of messages in one call. Always \
         prefer this over per-message modification."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Ids of the messages to modify"
                },
                "add_labels": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Labels to add (optional)"
                },
                "remove_labels": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Labels to remove (optional)"
                }
            },
            "required": ["message_ids"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        let message_ids = require_str_array(&params, self.name(), "message_ids")?;
        let add_labels = optional_str_array(&params, self.name(), "add_labels")?;
        let remove_labels = optional_str_array(&params, self.name(), "remove_labels")?;

        let start = std::time::Instant::now();
        self.gmail
            .batch_modify(&message_ids, &add_labels, &remove_labels)
            .await?;

        tracing::info!(
            count = message_ids.len(),
            ?add_labels,
            ?remove_labels,
            "Batch-modified messages"
        );
        let result = serde_json::json!({
            "modified": message_ids.len(),
        });
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

// ── ModifyMessageTool ───────────────────────────────────────────────

/// Modify labels on a single message.
pub struct ModifyMessageTool {
    gmail: Arc<dyn GmailApi>,
}

impl ModifyMessageTool {
    pub fn new(gmail: Arc<dyn GmailApi>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for ModifyMessageTool {
    fn name(&self) -> &str {
        "gmail_modify_message"
    }

    fn description(&self) -> &str {
        "Add and/or remove Gmail labels on a single message."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message_id": {
                    "type": "string",
                    "description": "Id of the message to modify"
                },
                "add_labels": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Labels to add (optional)"
                },
                "remove_labels": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Labels to remove (optional)"
                }
            },
            "required": ["message_id"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        let message_id = require_str(&params, self.name(), "message_id")?;
        let add_labels = optional_str_array(&params, self.name(), "add_labels")?;
        let remove_labels = optional_str_array(&params, self.name(), "remove_labels")?;

        let start = std::time::Instant::now();
        self.gmail
            .modify(message_id, &add_labels, &remove_labels)
            .await?;

        let result = serde_json::json!({"modified": message_id});
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

// ── TrashMessageTool ────────────────────────────────────────────────

/// Move a single message to trash (no batch form exists).
pub struct TrashMessageTool {
    gmail: Arc<dyn GmailApi>,
}

impl TrashMessageTool {
    pub fn new(gmail: Arc<dyn GmailApi>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for TrashMessageTool {
    fn name(&self) -> &str {
        "gmail_trash_message"
    }

    fn description(&self) -> &str {
        "Move a single message to the trash. Call once per message — there is no batch form."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message_id": {
                    "type": "string",
                    "description": "Id of the message to trash"
                }
            },
            "required": ["message_id"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        let message_id = require_str(&params, self.name(), "message_id")?;

        let start = std::time::Instant::now();
        self.gmail.trash(message_id).await?;

        let result = serde_json::json!({"trashed": message_id});
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}
