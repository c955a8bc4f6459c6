//! Channels
//!
//! Message contracts between the transports and the poll dispatcher, plus
//! the outbound sink trait collaborators implement. Identities and channel
//! names are opaque strings compared only for equality.

pub mod console;

use crate::poll::PollAnnouncement;
use crate::render::RenderArtifact;
use async_trait::async_trait;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur in channel operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Channel not connected")]
    NotConnected,

    #[error("Channel error: {0}")]
    Other(String),
}

/// Incoming message from a transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender identity.
    pub sender: String,
    /// Channel the message arrived on.
    pub channel: String,
    /// Raw message text.
    pub text: String,
}

impl InboundMessage {
    pub fn new(
        sender: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            channel: channel.into(),
            text: text.into(),
        }
    }
}

/// Message handler for incoming messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming message
    async fn handle_message(&self, message: InboundMessage);
}

/// Outbound side of a transport.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Send plain text to a channel.
    async fn send_text(&self, channel: &str, text: &str) -> ChannelResult<()>;

    /// Present an opened poll on a channel.
    async fn send_announcement(
        &self,
        channel: &str,
        announcement: &PollAnnouncement,
    ) -> ChannelResult<()>;

    /// Deliver a results artifact to a channel.
    async fn send_artifact(
        &self,
        channel: &str,
        caption: &str,
        artifact: &RenderArtifact,
    ) -> ChannelResult<()>;
}
