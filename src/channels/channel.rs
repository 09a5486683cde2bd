//! The client channel trait.

use async_trait::async_trait;

use crate::error::ChannelError;

/// Two-way interaction surface for the one client-facing node.
///
/// The pipeline suspends inside the client-facing node until
/// `await_confirmation` resolves — the only wait that crosses the system
/// boundary.
#[async_trait]
pub trait ClientChannel: Send + Sync {
    /// Show a message to the end user.
    async fn send_message(&self, text: &str) -> Result<(), ChannelError>;

    /// Block until the user confirms or declines.
    async fn await_confirmation(&self) -> Result<bool, ChannelError>;
}
