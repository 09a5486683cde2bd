//! Paged-data tools — the Paged Data Store's external-facing operations.
//!
//! `load_data` reads a bounded page plus a continuation flag; `append_data`
//! appends one record. Both operate on the run's own data directory, so a
//! session can never touch another session's files.

use async_trait::async_trait;

use crate::context::RunContext;
use crate::error::ToolError;
use crate::store::PagedStore;
use crate::tools::tool::{Tool, ToolOutput, require_str};

fn store_for(ctx: &RunContext) -> PagedStore {
    PagedStore::new(ctx.data_dir.clone())
}

fn store_err(tool: &str, e: crate::error::StoreError) -> ToolError {
    ToolError::ExecutionFailed {
        tool: tool.to_string(),
        reason: e.to_string(),
    }
}

// ── LoadDataTool ────────────────────────────────────────────────────

/// Read one page of records from a paged record file.
pub struct LoadDataTool {
    default_limit: usize,
}

impl LoadDataTool {
    pub fn new(default_limit: usize) -> Self {
        Self { default_limit }
    }
}

#[async_trait]
impl Tool for LoadDataTool {
    fn name(&self) -> &str {
        "load_data"
    }

    fn description(&self) -> &str {
        "Read records from a local data file. Returns up to 'limit' records starting at \
         'offset' plus a has_more flag; keep calling with increasing offset until \
         has_more is false."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Record file handle, e.g. 'emails.jsonl'"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum records to return (optional)"
                },
                "offset": {
                    "type": "integer",
                    "description": "Record index to start from (optional, default 0)"
                }
            },
            "required": ["filename"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        let filename = require_str(&params, self.name(), "filename")?;
        let limit = params
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(self.default_limit);
        let offset = params
            .get("offset")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;

        let start = std::time::Instant::now();
        let page = store_for(ctx)
            .load(filename, limit, offset)
            .await
            .map_err(|e| store_err(self.name(), e))?;

        let result = serde_json::json!({
            "records": page.records,
            "count": page.records.len(),
            "offset": offset,
            "has_more": page.has_more,
        });
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

// ── AppendDataTool ──────────────────────────────────────────────────

/// Append one record to a paged record file.
pub struct AppendDataTool;

impl AppendDataTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AppendDataTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AppendDataTool {
    fn name(&self) -> &str {
        "append_data"
    }

    fn description(&self) -> &str {
        "Append one JSON record as a line to a local data file, creating the file if absent."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Record file handle, e.g. 'actions.jsonl'"
                },
                "data": {
                    "description": "The record: a JSON object, or a string containing JSON"
                }
            },
            "required": ["filename", "data"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        let filename = require_str(&params, self.name(), "filename")?.to_string();
        let data = params
            .get("data")
            .cloned()
            .ok_or_else(|| ToolError::InvalidParameters {
                tool: self.name().to_string(),
                reason: "missing parameter 'data'".to_string(),
            })?;

        // Decision-makers often hand the record over as a JSON-encoded
        // string; unwrap one level so the file stays line-parseable.
        let record = match &data {
            serde_json::Value::String(s) => {
                serde_json::from_str(s).unwrap_or(serde_json::Value::String(s.clone()))
            }
            other => other.clone(),
        };

        let start = std::time::Instant::now();
        store_for(ctx)
            .append(&filename, &record)
            .await
            .map_err(|e| store_err(self.name(), e))?;

        let result = serde_json::json!({
            "filename": filename,
            "appended": true,
        });
        Ok(ToolOutput::success(result, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn ctx() -> (TempDir, RunContext) {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::with_data_dir(dir.path().to_path_buf());
        (dir, ctx)
    }

    #[tokio::test]
    async fn append_then_load_through_tools() {
        let (_dir, ctx) = ctx();
        let append = AppendDataTool::new();
        let load = LoadDataTool::new(50);

        append
            .execute(
                json!({"filename": "actions.jsonl", "data": {"email_id": "m1", "action": "trash"}}),
                &ctx,
            )
            .await
            .unwrap();

        let output = load
            .execute(json!({"filename": "actions.jsonl"}), &ctx)
            .await
            .unwrap();
        assert_eq!(output.result["count"], 1);
        assert_eq!(output.result["has_more"], false);
        assert_eq!(output.result["records"][0]["email_id"], "m1");
    }

    #[tokio::test]
    async fn append_unwraps_json_encoded_strings() {
        let (_dir, ctx) = ctx();
        let append = AppendDataTool::new();
        let load = LoadDataTool::new(50);

        append
            .execute(
                json!({"filename": "a.jsonl", "data": "{\"email_id\": \"m2\"}"}),
                &ctx,
            )
            .await
            .unwrap();

        let output = load
            .execute(json!({"filename": "a.jsonl"}), &ctx)
            .await
            .unwrap();
        assert_eq!(output.result["records"][0]["email_id"], "m2");
    }

    #[tokio::test]
    async fn load_paginates_with_explicit_limit() {
        let (_dir, ctx) = ctx();
        let append = AppendDataTool::new();
        let load = LoadDataTool::new(50);

        for i in 0..5 {
            append
                .execute(json!({"filename": "f.jsonl", "data": {"i": i}}), &ctx)
                .await
                .unwrap();
        }

        let first = load
            .execute(json!({"filename": "f.jsonl", "limit": 3}), &ctx)
            .await
            .unwrap();
        assert_eq!(first.result["count"], 3);
        assert_eq!(first.result["has_more"], true);

        let rest = load
            .execute(json!({"filename": "f.jsonl", "limit": 3, "offset": 3}), &ctx)
            .await
            .unwrap();
        assert_eq!(rest.result["count"], 2);
        assert_eq!(rest.result["has_more"], false);
    }

    #[tokio::test]
    async fn load_missing_file_fails() {
        let (_dir, ctx) = ctx();
        let load = LoadDataTool::new(50);
        let result = load.execute(json!({"filename": "ghost.jsonl"}), &ctx).await;
        assert!(matches!(result, Err(ToolError::ExecutionFailed { .. })));
    }

    #[tokio::test]
    async fn missing_params_rejected() {
        let (_dir, ctx) = ctx();
        let append = AppendDataTool::new();
        let result = append.execute(json!({"filename": "f.jsonl"}), &ctx).await;
        assert!(matches!(result, Err(ToolError::InvalidParameters { .. })));
    }
}
