//! Pipeline executor — sequential scheduler over an ordered node list.
//!
//! Runs each node in order, threading the state store forward. Fail-fast:
//! any contract violation aborts the run with the offending node named; no
//! rollback and no partial report. Cancellation is coarse-grained — the
//! flag is checked between nodes only, so an in-flight tool call always
//! finishes or fails on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::channels::ClientChannel;
use crate::config::EngineConfig;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::graph::runner::NodeRunner;
use crate::graph::spec::PipelineSpec;
use crate::graph::state::StateStore;
use crate::llm::Reasoner;
use crate::tools::ToolGateway;

/// Cooperative cancellation flag shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Honored before the next node starts.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs pipelines of node specs.
pub struct PipelineExecutor {
    runner: NodeRunner,
    cancel: CancellationFlag,
}

impl PipelineExecutor {
    pub fn new(
        config: &EngineConfig,
        reasoner: Arc<dyn Reasoner>,
        gateway: Arc<ToolGateway>,
        channel: Option<Arc<dyn ClientChannel>>,
    ) -> Self {
        Self {
            runner: NodeRunner::new(reasoner, gateway, channel, config.max_iterations),
            cancel: CancellationFlag::new(),
        }
    }

    /// The flag a caller can use to cancel this executor's runs.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Run `pipeline` to completion, returning the final state store.
    ///
    /// The seed store supplies externally provided values; every node's
    /// declared inputs are asserted present before it runs and its declared
    /// outputs asserted present after.
    pub async fn run(
        &self,
        pipeline: &PipelineSpec,
        seed: StateStore,
        ctx: &RunContext,
    ) -> Result<StateStore> {
        pipeline.validate().map_err(Error::Config)?;

        let mut state = seed;
        tracing::info!(
            pipeline = %pipeline.name,
            run_id = %ctx.run_id,
            nodes = pipeline.nodes.len(),
            "Pipeline starting"
        );

        for spec in &pipeline.nodes {
            if self.cancel.is_cancelled() {
                tracing::warn!(run_id = %ctx.run_id, node_id = %spec.id, "Run cancelled");
                return Err(Error::Cancelled {
                    run_id: ctx.run_id,
                    node_id: spec.id.clone(),
                });
            }

            tracing::info!(node_id = %spec.id, name = %spec.name, "Running node");
            if let Err(err) = self.runner.run(spec, &mut state, ctx).await {
                tracing::error!(node_id = %spec.id, error = %err, "Pipeline aborted");
                return Err(err);
            }

            // The runner enforces completion; this re-check guards the
            // executor-level contract independently of runner internals.
            for key in &spec.output_keys {
                debug_assert!(state.contains(key), "runner returned without output {key}");
            }
        }

        tracing::info!(
            pipeline = %pipeline.name,
            run_id = %ctx.run_id,
            keys = state.len(),
            "Pipeline complete"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::spec::{NodeSpec, NodeType};
    use crate::llm::script::set_output;
    use crate::llm::ScriptedReasoner;
    use crate::tools::ToolRegistry;
    use tempfile::TempDir;

    fn node(id: &str, inputs: &[&str], outputs: &[&str]) -> NodeSpec {
        NodeSpec {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            node_type: NodeType::EventLoop,
            client_facing: false,
            input_keys: inputs.iter().map(|s| s.to_string()).collect(),
            output_keys: outputs.iter().map(|s| s.to_string()).collect(),
            system_prompt: String::new(),
            tools: vec![],
        }
    }

    fn executor(turns: Vec<crate::llm::TurnOutcome>) -> PipelineExecutor {
        PipelineExecutor::new(
            &EngineConfig::default(),
            Arc::new(ScriptedReasoner::new(turns)),
            Arc::new(ToolGateway::new(Arc::new(ToolRegistry::new()))),
            None,
        )
    }

    fn ctx(dir: &TempDir) -> RunContext {
        RunContext::with_data_dir(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn threads_state_between_nodes() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a", &[], &["x"]), node("b", &["x"], &["y"])],
        };
        let executor = executor(vec![set_output("x", "1"), set_output("y", "2")]);
        let dir = TempDir::new().unwrap();

        let state = executor
            .run(&pipeline, StateStore::new(), &ctx(&dir))
            .await
            .unwrap();
        assert_eq!(state.get("x"), Some("1"));
        assert_eq!(state.get("y"), Some("2"));
    }

    #[tokio::test]
    async fn second_node_never_runs_when_first_fails() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a", &["absent"], &["x"]), node("b", &[], &["y"])],
        };
        // Script would satisfy node b, but the run must abort at node a.
        let executor = executor(vec![set_output("y", "2")]);
        let dir = TempDir::new().unwrap();

        let err = executor
            .run(&pipeline, StateStore::new(), &ctx(&dir))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Node(crate::error::NodeError::MissingInput { ref node_id, .. }) if node_id == "a"
        ));
    }

    #[tokio::test]
    async fn cancellation_honored_between_nodes() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a", &[], &["x"])],
        };
        let executor = executor(vec![set_output("x", "1")]);
        executor.cancellation_flag().cancel();
        let dir = TempDir::new().unwrap();

        let err = executor
            .run(&pipeline, StateStore::new(), &ctx(&dir))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { ref node_id, .. } if node_id == "a"));
    }

    #[tokio::test]
    async fn invalid_pipeline_rejected_up_front() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a", &[], &["x"]), node("a", &[], &["y"])],
        };
        let executor = executor(vec![]);
        let dir = TempDir::new().unwrap();

        let err = executor
            .run(&pipeline, StateStore::new(), &ctx(&dir))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
