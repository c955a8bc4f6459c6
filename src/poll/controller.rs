//! Poll Controller
//!
//! Owns the single active-poll slot and the permission checks around it.
//! Transitions are atomic: a failed check leaves the slot untouched, and
//! the lock is never held across collaborator I/O.

use super::session::{PollSession, SessionSettings};
use super::PollError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Prompt and ballot handed to the display collaborator when a poll opens.
#[derive(Debug, Clone)]
pub struct PollAnnouncement {
    /// Poll prompt.
    pub prompt: String,
    /// Letter and answer pairs, in ballot order.
    pub options: Vec<(char, String)>,
}

/// Final results extracted when a poll closes.
#[derive(Debug, Clone)]
pub struct PollResults {
    /// Poll prompt, used as the results title.
    pub prompt: String,
    /// Answer text and vote count, in ballot order.
    pub counts: Vec<(String, u32)>,
    /// Distinct voters who cast a vote.
    pub voters: usize,
}

/// Single-slot poll state machine: idle (slot empty) or open (slot full).
///
/// One mutex serializes every state mutation, covering both the
/// check-and-transition and the vote map. State lives only in this value;
/// a process restart always comes back idle.
#[derive(Debug)]
pub struct PollController {
    control_channel: String,
    settings: SessionSettings,
    active: Mutex<Option<PollSession>>,
}

impl PollController {
    /// Create an idle controller gated on the given control channel.
    pub fn new(control_channel: impl Into<String>, settings: SessionSettings) -> Self {
        Self {
            control_channel: control_channel.into(),
            settings,
            active: Mutex::new(None),
        }
    }

    /// Whether a poll is currently open.
    pub fn is_open(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Open a poll from a `start` command.
    ///
    /// Rejected while a poll is running or when the command does not come
    /// from the control channel. Definition errors propagate unchanged and
    /// leave the controller idle. The sender becomes the poll master.
    pub fn handle_start(
        &self,
        sender: &str,
        channel: &str,
        text: &str,
    ) -> Result<PollAnnouncement, PollError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(PollError::AlreadyRunning);
        }
        if channel != self.control_channel {
            return Err(PollError::WrongChannel(channel.to_string()));
        }

        let session = PollSession::parse(sender, text, &self.settings)?;
        let announcement = PollAnnouncement {
            prompt: session.prompt().to_string(),
            options: session.ballot().to_vec(),
        };
        info!(poll_master = %sender, prompt = %announcement.prompt, "poll opened");
        *active = Some(session);
        Ok(announcement)
    }

    /// Record a vote against the open poll.
    ///
    /// Votes are accepted unconditionally while a poll is open; gating by
    /// source channel is the transport's job. Letters outside the ballot
    /// are retained as silent no-ops, and a repeat voter replaces their
    /// earlier vote.
    pub fn handle_vote(&self, voter: &str, letter: char) -> Result<(), PollError> {
        let mut active = self.active.lock();
        match active.as_mut() {
            Some(session) => {
                session.record_vote(voter, letter);
                Ok(())
            }
            None => Err(PollError::NoActivePoll),
        }
    }

    /// Close the open poll and return its results.
    ///
    /// Only the poll master may close, and only from the control channel.
    /// The slot is cleared as soon as the tally is extracted; rendering and
    /// delivery happen afterwards, outside the lock, and a failure there
    /// never resurrects the poll.
    pub fn handle_close(&self, sender: &str, channel: &str) -> Result<PollResults, PollError> {
        let mut active = self.active.lock();
        let session = match active.as_ref() {
            Some(session) => session,
            None => return Err(PollError::NoActivePoll),
        };
        if sender != session.poll_master() {
            return Err(PollError::NotPollMaster);
        }
        if channel != self.control_channel {
            return Err(PollError::WrongChannel(channel.to_string()));
        }

        let results = PollResults {
            prompt: session.prompt().to_string(),
            counts: session.tally(),
            voters: session.voters(),
        };
        *active = None;
        info!(voters = results.voters, prompt = %results.prompt, "poll closed");
        Ok(results)
    }
}

/// Create a controller shared with the transport loop.
pub fn create_controller(
    control_channel: impl Into<String>,
    settings: SessionSettings,
) -> Arc<PollController> {
    Arc::new(PollController::new(control_channel, settings))
}
