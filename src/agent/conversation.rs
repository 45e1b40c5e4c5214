//! Conversation history management
//!
//! An append-only message log owned by the session. The agent loop works on
//! snapshots and never touches the log directly.

use crate::core::{Message, Role};

/// Manages conversation history
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    /// Message history
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message at the end
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Copy of the history, in order
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Borrow the history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Start over with an empty history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether every tool result sits in the block right after the assistant
    /// message that requested it, answering the calls in request order.
    pub fn is_well_ordered(&self) -> bool {
        let mut pending: &[crate::core::ToolCall] = &[];

        for msg in &self.messages {
            match msg.role {
                Role::Tool => match pending.split_first() {
                    Some((call, rest)) if msg.tool_call_id.as_deref() == Some(call.id.as_str()) => {
                        pending = rest;
                    }
                    _ => return false,
                },
                _ if !pending.is_empty() => return false,
                Role::Assistant => pending = msg.tool_calls.as_slice(),
                _ => {}
            }
        }

        pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;
    use serde_json::json;

    #[test]
    fn test_conversation_basic() {
        let mut conv = Conversation::new();
        conv.append(Message::user("Hello"));
        conv.append(Message::assistant("Hi there!"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0], Message::user("Hello"));
        assert_eq!(conv.last_assistant_message().unwrap().content, "Hi there!");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut conv = Conversation::new();
        conv.append(Message::user("1"));
        let mut snapshot = conv.snapshot();
        snapshot.push(Message::assistant("2"));

        assert_eq!(conv.len(), 1);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut conv = Conversation::new();
        conv.append(Message::user("1"));
        conv.clear();
        assert!(conv.is_empty());
    }

    #[test]
    fn test_well_ordered() {
        let a = ToolCall::new("a", "arxiv", json!({"query": "x"}));
        let b = ToolCall::new("b", "wikipedia", json!({"query": "y"}));

        let mut conv = Conversation::new();
        conv.append(Message::user("q"));
        conv.append(Message::assistant_with_tools("", vec![a.clone(), b.clone()]));
        conv.append(Message::tool_result(&a, "A"));
        conv.append(Message::tool_result(&b, "B"));
        conv.append(Message::assistant("answer"));
        assert!(conv.is_well_ordered());

        let mut orphan = Conversation::new();
        orphan.append(Message::user("q"));
        orphan.append(Message::tool_result(&a, "A"));
        assert!(!orphan.is_well_ordered());

        let mut interrupted = Conversation::new();
        interrupted.append(Message::assistant_with_tools("", vec![a.clone(), b.clone()]));
        interrupted.append(Message::tool_result(&a, "A"));
        interrupted.append(Message::user("hurry up"));
        assert!(!interrupted.is_well_ordered());
    }
}
