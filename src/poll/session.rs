//! Poll Session
//!
//! Parses a poll definition into a prompt and a lettered ballot, records
//! one vote per voter, and computes tallies.
//!
//! A definition looks like `$start question|answer1|answer2` with 2 to 6
//! answers. Bad vote letters are silently ignored.

use super::PollError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catch-all answer appended to the ballot when enabled. Never shuffled,
/// never eligible to be the correct answer.
pub const CATCH_ALL_ANSWER: &str = "I'm confused!";

/// Settings controlling how a poll definition becomes a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Field separator inside the definition string.
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Shuffle the answer order.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Append the catch-all answer after shuffling.
    #[serde(default = "default_true")]
    pub append_catch_all: bool,
}

fn default_separator() -> char {
    '|'
}

fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            separator: '|',
            shuffle: true,
            append_catch_all: true,
        }
    }
}

/// A single open poll: prompt, lettered ballot, and the votes so far.
///
/// The ballot is built once at construction and is immutable afterwards.
#[derive(Debug)]
pub struct PollSession {
    poll_master: String,
    prompt: String,
    ballot: Vec<(char, String)>,
    correct_index: usize,
    votes: HashMap<String, char>,
}

impl PollSession {
    /// Parse a poll definition, shuffling with the ambient RNG.
    pub fn parse(
        poll_master: impl Into<String>,
        command: &str,
        settings: &SessionSettings,
    ) -> Result<Self, PollError> {
        Self::parse_with_rng(poll_master, command, settings, &mut rand::thread_rng())
    }

    /// Parse a poll definition, shuffling with the supplied RNG.
    ///
    /// The first field is the prompt with the invoking command token still
    /// attached; the remaining fields are answers. The first listed answer
    /// is recorded as the correct one before any shuffling, and its
    /// post-shuffle position is retained in [`correct_index`].
    ///
    /// [`correct_index`]: PollSession::correct_index
    pub fn parse_with_rng<R: Rng>(
        poll_master: impl Into<String>,
        command: &str,
        settings: &SessionSettings,
        rng: &mut R,
    ) -> Result<Self, PollError> {
        let fields: Vec<&str> = command.split(settings.separator).collect();
        if fields.len() < 3 || fields.len() > 7 {
            return Err(PollError::MalformedDefinition(fields.len()));
        }

        // Drop the command's own token from the prompt field.
        let prompt = fields[0]
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let mut answers: Vec<String> = fields[1..].iter().map(|f| f.trim().to_string()).collect();

        let correct_answer = answers[0].clone();
        if settings.shuffle {
            answers.shuffle(rng);
        }
        // First matching position wins when answer texts repeat.
        let correct_index = answers
            .iter()
            .position(|a| *a == correct_answer)
            .unwrap_or(0);

        if settings.append_catch_all {
            answers.push(CATCH_ALL_ANSWER.to_string());
        }

        // 6 answers plus the catch-all caps the ballot at 7 letters, A-G.
        let ballot = answers
            .into_iter()
            .enumerate()
            .map(|(i, text)| ((b'A' + i as u8) as char, text))
            .collect();

        Ok(Self {
            poll_master: poll_master.into(),
            prompt,
            ballot,
            correct_index,
            votes: HashMap::new(),
        })
    }

    /// Poll prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Letter and answer pairs, in ballot order.
    pub fn ballot(&self) -> &[(char, String)] {
        &self.ballot
    }

    /// Identity that started and thus controls the poll.
    pub fn poll_master(&self) -> &str {
        &self.poll_master
    }

    /// Post-shuffle position of the originally-first answer.
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Number of distinct voters so far.
    pub fn voters(&self) -> usize {
        self.votes.len()
    }

    /// Record a vote. Each voter holds one vote; voting again replaces the
    /// earlier one. Letters outside the ballot are kept but never match a
    /// tally bucket.
    pub fn record_vote(&mut self, voter: impl Into<String>, letter: char) {
        self.votes.insert(voter.into(), letter);
    }

    /// Count current votes per ballot entry, in ballot order.
    ///
    /// Computed fresh from the vote map on every call. Answers nobody
    /// picked appear with a zero count.
    pub fn tally(&self) -> Vec<(String, u32)> {
        self.ballot
            .iter()
            .map(|(letter, text)| {
                let count = self.votes.values().filter(|v| **v == *letter).count() as u32;
                (text.clone(), count)
            })
            .collect()
    }
}
