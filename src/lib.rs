//! inbox-pilot — node-graph execution engine for an email-management agent.

pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod llm;
pub mod mail;
pub mod pipeline;
pub mod store;
pub mod tools;
