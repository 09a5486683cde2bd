//! Error types for inbox-pilot.

use uuid::Uuid;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Node contract violation: {0}")]
    Node(#[from] NodeError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Pipeline run {run_id} cancelled before node {node_id}")]
    Cancelled { run_id: Uuid, node_id: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid pipeline definition: {0}")]
    InvalidPipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Node contract violations. All fatal to the run — the executor reports
/// which node and which contract was violated and aborts.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Node {node_id} requires input key '{key}' which is not in the state store")]
    MissingInput { node_id: String, key: String },

    #[error("Node {node_id} completed without setting output key '{key}'")]
    IncompleteOutput { node_id: String, key: String },

    #[error("Node {node_id} set output key '{key}' more than once")]
    DuplicateOutput { node_id: String, key: String },

    #[error("Node {node_id} set undeclared output key '{key}'")]
    UndeclaredOutput { node_id: String, key: String },

    #[error("Node {node_id} exhausted its iteration budget ({budget}) before completing")]
    BudgetExhausted { node_id: String, budget: usize },

    #[error("Node {node_id} is client-facing but the user declined to confirm")]
    ConfirmationDenied { node_id: String },
}

/// Tool dispatch and execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {tool} is not in the whitelist of node {node_id}")]
    NotPermitted { node_id: String, tool: String },

    #[error("Tool {0} not found in registry")]
    NotFound(String),

    #[error("Invalid parameters for tool {tool}: {reason}")]
    InvalidParameters { tool: String, reason: String },

    #[error("Tool {tool} execution failed: {reason}")]
    ExecutionFailed { tool: String, reason: String },
}

/// Paged data store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid record filename: {0}")]
    InvalidFilename(String),

    #[error("Record file not found: {0}")]
    FileNotFound(String),

    #[error("Malformed record at {filename}:{line}: {reason}")]
    MalformedRecord {
        filename: String,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decision-maker (LLM) errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message to client: {0}")]
    SendFailed(String),

    #[error("Client channel closed while awaiting confirmation")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
