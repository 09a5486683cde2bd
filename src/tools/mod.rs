//! Tool abstraction — the only path for externally visible side effects.

pub mod builtin;
pub mod gateway;
pub mod registry;
pub mod tool;

pub use gateway::ToolGateway;
pub use registry::ToolRegistry;
pub use tool::*;
