//! Turns and the append-only transcript of a chat session.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::to_writer_pretty;

use crate::error::{Error, Result};

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,
    /// The model, or the session speaking on its behalf when the model call failed.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in the conversation.  Turns are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    error: bool,
}

impl Turn {
    /// A turn typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            error: false,
        }
    }

    /// A turn answered by the model.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            error: false,
        }
    }

    /// An assistant turn standing in for a failed completion.
    ///
    /// The content is `"Error: "` followed by the error's bare message.
    pub fn error(err: &Error) -> Self {
        Self {
            role: Role::Assistant,
            content: format!("Error: {}", err.message()),
            error: true,
        }
    }

    /// Who wrote the turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of the turn.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True for assistant turns that record a failed completion.
    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// The ordered, append-only history of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Every turn, in the order they were appended.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True if no turn has been appended.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterate over the turns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Number of assistant turns that record a failed completion.
    pub fn error_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_error()).count()
    }

    /// The completed exchanges worth sending back to the model as context.
    ///
    /// A user turn is kept only when the next turn is a successful assistant answer; failed
    /// exchanges and a trailing unanswered user turn are left out.
    pub fn exchanges(&self) -> Vec<Turn> {
        let mut context = Vec::with_capacity(self.turns.len());
        let mut turns = self.turns.iter().peekable();
        while let Some(turn) = turns.next() {
            if turn.role() != Role::User {
                continue;
            }
            if let Some(answer) = turns.peek()
                && answer.role() == Role::Assistant
                && !answer.is_error()
            {
                context.push(turn.clone());
                context.push((*answer).clone());
                turns.next();
            }
        }
        context
    }

    /// Export the transcript as pretty-printed JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &TranscriptFile::new(&self.turns)).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[derive(Serialize)]
struct TranscriptFile<'a> {
    version: u8,
    turns: &'a [Turn],
}

impl<'a> TranscriptFile<'a> {
    fn new(turns: &'a [Turn]) -> Self {
        Self { version: 1, turns }
    }
}
