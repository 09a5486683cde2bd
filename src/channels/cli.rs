//! CLI client channel — stdout messages, stdin confirmation.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::channel::ClientChannel;
use crate::error::ChannelError;

/// Terminal-backed client channel.
#[derive(Debug, Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClientChannel for CliChannel {
    async fn send_message(&self, text: &str) -> Result<(), ChannelError> {
        println!("\n{}\n", text);
        Ok(())
    }

    async fn await_confirmation(&self) -> Result<bool, ChannelError> {
        println!("Confirm? [y/N]");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await? {
            Some(line) => {
                let answer = line.trim().to_lowercase();
                Ok(answer == "y" || answer == "yes")
            }
            None => Err(ChannelError::Closed),
        }
    }
}
