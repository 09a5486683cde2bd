//! Client channel — the two-way surface for the client-facing node.

pub mod channel;
pub mod cli;

pub use channel::ClientChannel;
pub use cli::CliChannel;
