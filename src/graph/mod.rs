//! Node-graph execution engine: specs, state ledger, node runner, executor.

pub mod executor;
pub mod runner;
pub mod spec;
pub mod state;

pub use executor::{CancellationFlag, PipelineExecutor};
pub use spec::{NodeSpec, NodeType, PipelineSpec};
pub use state::StateStore;
