//! Append-only conversation memory for workflow agents.

use loom_adapters::traits::ChatMessage;

/// Ordered transcript of one workflow agent's conversation.
///
/// Memory is append-only and unbounded: turns accumulate for as long as the
/// owning agent stays cached. There is no eviction, so long-lived agents
/// carry their full history into every model call.
#[derive(Clone, Debug, Default)]
pub struct ConversationMemory {
    turns: Vec<ChatMessage>,
}

impl ConversationMemory {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript seeded with a system message.
    #[must_use]
    pub fn with_system(message: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatMessage::system(message)],
        }
    }

    /// Appends a turn to the transcript.
    pub fn push(&mut self, turn: ChatMessage) {
        self.turns.push(turn);
    }

    /// Returns the transcript in insertion order.
    #[must_use]
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Returns the number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` when no turns have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_adapters::traits::MessageRole;

    #[test]
    fn system_seed_is_first_turn() {
        let memory = ConversationMemory::with_system("You are helpful.");
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.turns()[0].role(), MessageRole::System);
    }

    #[test]
    fn turns_accumulate_in_order() {
        let mut memory = ConversationMemory::new();
        memory.push(ChatMessage::user("hello"));
        memory.push(ChatMessage::assistant("hi"));
        memory.push(ChatMessage::user("bye"));

        let contents: Vec<_> = memory.turns().iter().map(ChatMessage::content).collect();
        assert_eq!(contents, ["hello", "hi", "bye"]);
    }
}
