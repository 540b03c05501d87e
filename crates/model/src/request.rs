use serde::{Deserialize, Serialize};

/// A request to be sent to the completion provider.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// The conversation turns, oldest first.
    pub turns: Vec<ChatTurn>,
    /// The sampling temperature, if the caller wants to override the
    /// provider's default.
    pub temperature: Option<f64>,
}

/// One role-tagged turn in an LLM-facing conversation.
///
/// Turns are immutable once constructed, and a sequence of turns is
/// always ordered conversation-chronologically (oldest first).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatTurn {
    /// The system instructions.
    System(String),
    /// A message authored by a human participant.
    Human(String),
    /// A previous reply by the assistant.
    Assistant(String),
}

impl ChatTurn {
    /// Returns the text content of this turn.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            ChatTurn::System(text)
            | ChatTurn::Human(text)
            | ChatTurn::Assistant(text) => text,
        }
    }
}
