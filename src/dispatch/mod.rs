//! Command Dispatch
//!
//! Turns inbound channel messages into poll commands and routes them:
//! `start` and `close` drive the controller lifecycle, and single-letter
//! commands become votes looked up against the active ballot. One generic
//! vote path handles every letter.

use crate::channels::{ChannelSink, InboundMessage, MessageHandler};
use crate::poll::PollController;
use crate::render::{RenderRequest, TallyRenderer};
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// A recognized poll command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a poll; carries the full text for definition parsing.
    Start(String),
    /// Close the open poll.
    Close,
    /// Cast a vote for one ballot letter.
    Vote(char),
}

/// Parse a prefixed command out of raw message text.
///
/// Returns `None` when the text does not start with the prefix or the
/// first token is not a known command. Single alphabetic tokens are votes,
/// uppercased so `$a` and `$A` count the same.
pub fn parse_command(text: &str, prefix: &str) -> Option<Command> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix(prefix)?;
    let token = rest.split_whitespace().next()?;
    match token {
        "start" => Some(Command::Start(trimmed.to_string())),
        "close" => Some(Command::Close),
        _ => {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    Some(Command::Vote(letter.to_ascii_uppercase()))
                }
                _ => None,
            }
        }
    }
}

/// Routes parsed commands between the transports and the controller.
///
/// The controller only sees plain data; presentation and rendering happen
/// here, after the controller's lock has been released.
pub struct Dispatcher {
    controller: Arc<PollController>,
    sink: Arc<dyn ChannelSink>,
    renderer: Arc<dyn TallyRenderer>,
    command_prefix: String,
    display_channel: String,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<PollController>,
        sink: Arc<dyn ChannelSink>,
        renderer: Arc<dyn TallyRenderer>,
        command_prefix: impl Into<String>,
        display_channel: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            sink,
            renderer,
            command_prefix: command_prefix.into(),
            display_channel: display_channel.into(),
        }
    }

    async fn on_start(&self, message: &InboundMessage, text: &str) {
        match self
            .controller
            .handle_start(&message.sender, &message.channel, text)
        {
            Ok(announcement) => {
                if let Err(error) = self
                    .sink
                    .send_announcement(&self.display_channel, &announcement)
                    .await
                {
                    warn!(error = %error, "failed to present poll");
                }
            }
            Err(error) => self.reply_error(&message.channel, &error).await,
        }
    }

    async fn on_vote(&self, message: &InboundMessage, letter: char) {
        // Votes only count from the display channel.
        if message.channel != self.display_channel {
            debug!(
                channel = %message.channel,
                "vote from outside the display channel ignored"
            );
            return;
        }
        if let Err(error) = self.controller.handle_vote(&message.sender, letter) {
            self.reply_error(&message.channel, &error).await;
        }
    }

    async fn on_close(&self, message: &InboundMessage) {
        let results = match self
            .controller
            .handle_close(&message.sender, &message.channel)
        {
            Ok(results) => results,
            Err(error) => return self.reply_error(&message.channel, &error).await,
        };

        // The poll is closed from here on; a render or delivery failure is
        // reported but not retried.
        let request = RenderRequest {
            title: results.prompt,
            counts: results.counts,
        };
        match self.renderer.render(&request) {
            Ok(artifact) => {
                if let Err(error) = self
                    .sink
                    .send_artifact(&self.display_channel, "poll result", &artifact)
                    .await
                {
                    warn!(error = %error, "failed to deliver poll results");
                }
            }
            Err(error) => {
                warn!(error = %error, "failed to render poll results");
                self.reply_error(&message.channel, &error).await;
            }
        }
    }

    async fn reply_error(&self, channel: &str, error: &impl Display) {
        warn!(channel = %channel, error = %error, "command rejected");
        if let Err(send_error) = self.sink.send_text(channel, &error.to_string()).await {
            warn!(error = %send_error, "failed to send error reply");
        }
    }
}

#[async_trait]
impl MessageHandler for Dispatcher {
    async fn handle_message(&self, message: InboundMessage) {
        match parse_command(&message.text, &self.command_prefix) {
            Some(Command::Start(text)) => self.on_start(&message, &text).await,
            Some(Command::Vote(letter)) => self.on_vote(&message, letter).await,
            Some(Command::Close) => self.on_close(&message).await,
            None => debug!(channel = %message.channel, "no command in message"),
        }
    }
}
