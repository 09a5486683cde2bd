//! Tool gateway — validates and dispatches tool invocations.
//!
//! Every tool call a node makes passes through here. The gateway rejects
//! anything outside the node's declared whitelist before execution, so a
//! misconfigured spec or an out-of-scope decision never reaches a tool.
//! Stateless between calls; retry policy belongs to the tool implementation.

use std::sync::Arc;

use crate::context::RunContext;
use crate::error::ToolError;
use crate::graph::spec::NodeSpec;
use crate::llm::ToolDefinition;
use crate::tools::registry::ToolRegistry;
use crate::tools::tool::ToolOutput;

/// Whitelist-enforcing dispatcher over a shared registry.
pub struct ToolGateway {
    registry: Arc<ToolRegistry>,
}

impl ToolGateway {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Tool definitions the given node is allowed to see.
    pub async fn definitions_for_node(&self, node: &NodeSpec) -> Vec<ToolDefinition> {
        self.registry.definitions_for(&node.tools).await
    }

    /// Invoke `tool_id` on behalf of `node`.
    ///
    /// Fails with `NotPermitted` before any external effect when the tool is
    /// not in the node's whitelist.
    pub async fn invoke(
        &self,
        node: &NodeSpec,
        tool_id: &str,
        args: serde_json::Value,
        ctx: &RunContext,
    ) -> Result<ToolOutput, ToolError> {
        if !node.tools.iter().any(|t| t == tool_id) {
            tracing::warn!(node_id = %node.id, tool = tool_id, "Rejected non-whitelisted tool call");
            return Err(ToolError::NotPermitted {
                node_id: node.id.clone(),
                tool: tool_id.to_string(),
            });
        }

        let tool = self
            .registry
            .get(tool_id)
            .await
            .ok_or_else(|| ToolError::NotFound(tool_id.to_string()))?;

        tracing::debug!(node_id = %node.id, tool = tool_id, "Dispatching tool call");
        let output = tool.execute(args, ctx).await?;
        tracing::debug!(
            node_id = %node.id,
            tool = tool_id,
            duration_ms = output.duration.as_millis() as u64,
            "Tool call completed"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::spec::{NodeSpec, NodeType};
    use crate::tools::tool::Tool;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingTool {
        executions: AtomicUsize,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "counting"
        }
        fn description(&self) -> &str {
            "counts executions"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _params: serde_json::Value,
            _ctx: &RunContext,
        ) -> Result<ToolOutput, ToolError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutput::success(
                serde_json::json!({"ok": true}),
                Duration::from_millis(1),
            ))
        }
    }

    fn node_with_tools(tools: &[&str]) -> NodeSpec {
        NodeSpec {
            id: "test-node".into(),
            name: "Test".into(),
            description: String::new(),
            node_type: NodeType::EventLoop,
            client_facing: false,
            input_keys: vec![],
            output_keys: vec!["out".into()],
            system_prompt: String::new(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn whitelisted_tool_executes() {
        let registry = Arc::new(ToolRegistry::new());
        let tool = Arc::new(CountingTool {
            executions: AtomicUsize::new(0),
        });
        registry.register_sync(tool.clone());
        let gateway = ToolGateway::new(registry);

        let node = node_with_tools(&["counting"]);
        let ctx = RunContext::with_data_dir("/tmp/unused".into());
        let output = gateway
            .invoke(&node, "counting", serde_json::json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(output.result["ok"], true);
        assert_eq!(tool.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_whitelisted_tool_never_executes() {
        let registry = Arc::new(ToolRegistry::new());
        let tool = Arc::new(CountingTool {
            executions: AtomicUsize::new(0),
        });
        registry.register_sync(tool.clone());
        let gateway = ToolGateway::new(registry);

        let node = node_with_tools(&["something_else"]);
        let ctx = RunContext::with_data_dir("/tmp/unused".into());
        let result = gateway
            .invoke(&node, "counting", serde_json::json!({}), &ctx)
            .await;

        assert!(matches!(result, Err(ToolError::NotPermitted { .. })));
        assert_eq!(tool.executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitelisted_but_unregistered_tool_is_not_found() {
        let gateway = ToolGateway::new(Arc::new(ToolRegistry::new()));
        let node = node_with_tools(&["ghost"]);
        let ctx = RunContext::with_data_dir("/tmp/unused".into());
        let result = gateway
            .invoke(&node, "ghost", serde_json::json!({}), &ctx)
            .await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn definitions_limited_to_whitelist() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register_sync(Arc::new(CountingTool {
            executions: AtomicUsize::new(0),
        }));
        let gateway = ToolGateway::new(registry);

        let allowed = node_with_tools(&["counting"]);
        assert_eq!(gateway.definitions_for_node(&allowed).await.len(), 1);

        let denied = node_with_tools(&[]);
        assert!(gateway.definitions_for_node(&denied).await.is_empty());
    }
}
