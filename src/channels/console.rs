//! Console Channel
//!
//! Line-based local transport: reads `sender#channel text` lines from
//! stdin and prints outbound traffic. Stands in for a chat-platform
//! transport when running locally or in tests.

use super::{ChannelResult, ChannelSink, InboundMessage, MessageHandler};
use crate::poll::PollAnnouncement;
use crate::render::RenderArtifact;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Console-backed channel sink.
#[derive(Debug)]
pub struct ConsoleChannel {
    command_prefix: String,
}

impl ConsoleChannel {
    pub fn new(command_prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: command_prefix.into(),
        }
    }

    /// Parse one `sender#channel text` input line.
    ///
    /// Returns `None` for blank or malformed lines.
    pub fn parse_line(line: &str) -> Option<InboundMessage> {
        let line = line.trim();
        let (origin, text) = line.split_once(' ')?;
        let (sender, channel) = origin.split_once('#')?;
        let text = text.trim();
        if sender.is_empty() || channel.is_empty() || text.is_empty() {
            return None;
        }
        Some(InboundMessage::new(sender, channel, text))
    }
}

#[async_trait]
impl ChannelSink for ConsoleChannel {
    async fn send_text(&self, channel: &str, text: &str) -> ChannelResult<()> {
        println!("[#{channel}] {text}");
        Ok(())
    }

    async fn send_announcement(
        &self,
        channel: &str,
        announcement: &PollAnnouncement,
    ) -> ChannelResult<()> {
        println!("[#{channel}] **{}**", announcement.prompt);
        for (letter, text) in &announcement.options {
            println!("[#{channel}]   {letter}: {text}");
        }
        println!(
            "[#{channel}] Choose the best answer. Example: to select 'A', post '{prefix}A' here. \
             You can vote many times, but only your last vote is counted.",
            prefix = self.command_prefix,
        );
        Ok(())
    }

    async fn send_artifact(
        &self,
        channel: &str,
        caption: &str,
        artifact: &RenderArtifact,
    ) -> ChannelResult<()> {
        println!("[#{channel}] {caption}: {}", artifact.data_path.display());
        if let Some(image) = &artifact.image_path {
            println!("[#{channel}] image: {}", image.display());
        }
        Ok(())
    }
}

/// Read stdin lines and feed them to the handler until EOF.
pub async fn run_stdin_loop(handler: Arc<dyn MessageHandler>) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        match ConsoleChannel::parse_line(&line) {
            Some(message) => handler.handle_message(message).await,
            None => debug!(line = %line, "ignoring malformed input line"),
        }
    }
    Ok(())
}
