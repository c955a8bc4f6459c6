//! End-to-end poll flow
//!
//! Drives the dispatcher the way a transport would: start from the control
//! channel, votes on the display channel, close, and checks both the
//! outbound traffic and the written artifact.

use async_trait::async_trait;
use parking_lot::Mutex;
use quorum::channels::{ChannelResult, ChannelSink, InboundMessage, MessageHandler};
use quorum::dispatch::Dispatcher;
use quorum::poll::{PollAnnouncement, PollController, SessionSettings};
use quorum::render::{CsvRenderer, RenderArtifact};
use std::sync::Arc;

/// Records outbound traffic instead of sending it anywhere.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    fn messages_on(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChannelSink for RecordingSink {
    async fn send_text(&self, channel: &str, text: &str) -> ChannelResult<()> {
        self.sent
            .lock()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_announcement(
        &self,
        channel: &str,
        announcement: &PollAnnouncement,
    ) -> ChannelResult<()> {
        let options = announcement
            .options
            .iter()
            .map(|(letter, text)| format!("{letter}:{text}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.sent.lock().push((
            channel.to_string(),
            format!("announce {} [{options}]", announcement.prompt),
        ));
        Ok(())
    }

    async fn send_artifact(
        &self,
        channel: &str,
        caption: &str,
        artifact: &RenderArtifact,
    ) -> ChannelResult<()> {
        self.sent.lock().push((
            channel.to_string(),
            format!("{caption}: {}", artifact.data_path.display()),
        ));
        Ok(())
    }
}

fn message(sender: &str, channel: &str, text: &str) -> InboundMessage {
    InboundMessage::new(sender, channel, text)
}

fn fixture(dir: &std::path::Path) -> (Arc<PollController>, Arc<RecordingSink>, Dispatcher) {
    let settings = SessionSettings {
        separator: '|',
        shuffle: false,
        append_catch_all: false,
    };
    let controller = Arc::new(PollController::new("control", settings));
    let sink = Arc::new(RecordingSink::default());
    let renderer = Arc::new(CsvRenderer::new(dir));
    let dispatcher = Dispatcher::new(
        controller.clone(),
        sink.clone(),
        renderer,
        "$",
        "voting",
    );
    (controller, sink, dispatcher)
}

#[tokio::test]
async fn full_poll_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, sink, dispatcher) = fixture(dir.path());

    // Nothing to close before a poll starts.
    dispatcher
        .handle_message(message("alice", "control", "$close"))
        .await;
    // Starting from the display channel is rejected.
    dispatcher
        .handle_message(message("alice", "voting", "$start Is the sky blue?|Yes|No"))
        .await;
    assert!(!controller.is_open());

    dispatcher
        .handle_message(message("alice", "control", "$start Is the sky blue?|Yes|No"))
        .await;
    assert!(controller.is_open());

    let announced = sink.messages_on("voting");
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0], "announce Is the sky blue? [A:Yes B:No]");

    // Three Yes, one No; the lowercase vote counts as its uppercase letter.
    for (user, text) in [("u1", "$A"), ("u2", "$A"), ("u3", "$B"), ("u4", "$a")] {
        dispatcher.handle_message(message(user, "voting", text)).await;
    }
    // An off-ballot letter is kept but lands in no bucket.
    dispatcher.handle_message(message("u5", "voting", "$Z")).await;
    // A vote from outside the display channel never reaches the poll.
    dispatcher.handle_message(message("u6", "control", "$B")).await;
    // Chatter without the prefix is ignored.
    dispatcher
        .handle_message(message("u7", "voting", "what is this poll about?"))
        .await;

    // Only the poll master closes it.
    dispatcher
        .handle_message(message("mallory", "control", "$close"))
        .await;
    assert!(controller.is_open());

    dispatcher
        .handle_message(message("alice", "control", "$close"))
        .await;
    assert!(!controller.is_open());

    // The artifact was delivered to the display channel and holds the counts.
    let delivered = sink.messages_on("voting");
    assert!(delivered.iter().any(|m| m.starts_with("poll result: ")));

    let csv = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .expect("csv artifact written");
    let contents = std::fs::read_to_string(csv).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["# Is the sky blue?", "Yes,3", "No,1"]);
}

#[tokio::test]
async fn rejected_commands_get_error_replies() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, sink, dispatcher) = fixture(dir.path());

    dispatcher
        .handle_message(message("alice", "control", "$start Q|a|b"))
        .await;
    dispatcher
        .handle_message(message("bob", "control", "$start Another|x|y"))
        .await;

    let replies = sink.messages_on("control");
    assert!(replies.iter().any(|m| m.contains("already running")));

    // A malformed definition after close leaves the controller idle.
    dispatcher
        .handle_message(message("alice", "control", "$close"))
        .await;
    dispatcher
        .handle_message(message("alice", "control", "$start Q|OnlyOne"))
        .await;
    assert!(!controller.is_open());

    let replies = sink.messages_on("control");
    assert!(replies.iter().any(|m| m.contains("2 to 6 answers")));
}

#[tokio::test]
async fn catch_all_option_rides_along() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SessionSettings {
        separator: '|',
        shuffle: false,
        append_catch_all: true,
    };
    let controller = Arc::new(PollController::new("control", settings));
    let sink = Arc::new(RecordingSink::default());
    let renderer = Arc::new(CsvRenderer::new(dir.path()));
    let dispatcher = Dispatcher::new(
        controller.clone(),
        sink.clone(),
        renderer,
        "$",
        "voting",
    );

    dispatcher
        .handle_message(message("alice", "control", "$start Q|Yes|No"))
        .await;
    dispatcher.handle_message(message("u1", "voting", "$C")).await;
    dispatcher
        .handle_message(message("alice", "control", "$close"))
        .await;

    let csv = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .expect("csv artifact written");
    let contents = std::fs::read_to_string(csv).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["# Q", "Yes,0", "No,0", "I'm confused!,1"]);
}
