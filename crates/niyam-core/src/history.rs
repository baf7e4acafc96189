use std::collections::VecDeque;

use crate::types::{ChatMessage, Speaker};

/// One speaker-tagged utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    /// The message form sent to a completion backend: `[SPEAKER]: text`.
    /// Consumer turns carry the user role, counsel and bench the assistant role.
    pub fn to_message(&self) -> ChatMessage {
        let content = format!("[{}]: {}", self.speaker.tag(), self.text);
        match self.speaker {
            Speaker::Consumer => ChatMessage::user(content),
            Speaker::Judge | Speaker::Defense => ChatMessage::assistant(content),
        }
    }
}

/// Append-only conversation shared by every completion call in a run.
///
/// With a limit of 0 the history grows without bound. A non-zero limit keeps
/// only the most recent turns; the remaining ones stay in order.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    limit: usize,
    dropped: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push_back(Turn {
            speaker,
            text: text.into(),
        });
        if self.limit > 0 {
            while self.turns.len() > self.limit {
                self.turns.pop_front();
                self.dropped += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns evicted by the bound so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}
