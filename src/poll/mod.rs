//! Polling Module
//!
//! Single-poll session state and the controller that owns its lifecycle.

pub mod controller;
pub mod session;

pub use controller::{create_controller, PollAnnouncement, PollController, PollResults};
pub use session::{PollSession, SessionSettings, CATCH_ALL_ANSWER};

use thiserror::Error;

/// Errors surfaced by poll lifecycle operations.
///
/// Every failure is a local validation failure: the operation returns the
/// error synchronously and leaves poll state exactly as it was.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll definition should look like: question|answer1|answer2|... (2 to 6 answers), got {0} fields")]
    MalformedDefinition(usize),

    #[error("a poll is already running")]
    AlreadyRunning,

    #[error("no poll is currently running")]
    NoActivePoll,

    #[error("the poll cannot be controlled from channel '{0}'")]
    WrongChannel(String),

    #[error("only the poll master may close this poll")]
    NotPollMaster,
}
