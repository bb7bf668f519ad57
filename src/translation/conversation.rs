/*!
 * Conversation values sent to the chat model.
 *
 * A conversation is created fresh for every translator run and is never
 * mutated in place: continuing a truncated answer produces a new value with
 * two more turns, so each attempt can be inspected on its own.
 */

use serde::{Deserialize, Serialize};

/// Instruction appended when the model stopped before emitting JSON
pub const CONTINUE_INSTRUCTION: &str = "Please continue to execute";

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered turn history for one batch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Turns in send order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of continuation requests this conversation carries
    pub fn continuation_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.role == Role::User && turn.content == CONTINUE_INSTRUCTION)
            .count()
    }
}

/// Builds and extends conversations
pub struct ConversationBuilder;

impl ConversationBuilder {
    /// Start a conversation: the system prompt followed by the batch JSON
    pub fn build(system_prompt: &str, batch_content_json: &str) -> Conversation {
        Conversation {
            turns: vec![
                Turn::new(Role::System, system_prompt),
                Turn::new(Role::User, batch_content_json),
            ],
        }
    }

    /// Echo the model's incomplete reply and ask it to go on
    pub fn extend(conversation: &Conversation, model_reply: &str) -> Conversation {
        let mut turns = Vec::with_capacity(conversation.turns.len() + 2);
        turns.extend_from_slice(&conversation.turns);
        turns.push(Turn::new(Role::Assistant, model_reply));
        turns.push(Turn::new(Role::User, CONTINUE_INSTRUCTION));
        Conversation { turns }
    }
}
