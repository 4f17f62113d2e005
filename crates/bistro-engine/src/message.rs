//! Transcript types for the restaurant chat.
//!
//! A [`Transcript`] is the ordered, append-only history of one session. It
//! always starts with the assistant greeting and only the conversation
//! controller appends to it.

use crate::wire::ContextEntry;
use serde::{Deserialize, Serialize};

/// Greeting seeded as the first assistant turn of every session.
pub const GREETING: &str =
    "Hi! I'm your restaurant assistant. Ask about hours, menu, reservations, or delivery.";

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the chat.
    User,
    /// The restaurant assistant backend.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in the conversation.
///
/// Fields are private so a message cannot be edited once it is part of a
/// transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    role: Role,
    content: String,
    suggestions: Vec<String>,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new assistant message without suggestions.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with_suggestions(content, Vec::new())
    }

    /// Create a new assistant message carrying quick-reply suggestions.
    pub fn assistant_with_suggestions(content: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            suggestions,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Quick-reply suggestions. Always empty for user messages.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The role-and-content projection sent upstream as context.
    pub fn to_context_entry(&self) -> ContextEntry {
        ContextEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Ordered, append-only chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Create a transcript seeded with [`GREETING`].
    pub fn seeded() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages in chronological order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Project the whole history to role-and-content pairs, oldest first.
    pub fn context(&self) -> Vec<ContextEntry> {
        self.messages.iter().map(ChatMessage::to_context_entry).collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_transcript_starts_with_greeting() {
        let transcript = Transcript::seeded();
        assert_eq!(transcript.len(), 1);
        let first = &transcript.messages()[0];
        assert_eq!(first.role(), Role::Assistant);
        assert_eq!(first.content(), GREETING);
        assert!(first.suggestions().is_empty());
    }

    #[test]
    fn test_user_message_has_no_suggestions() {
        let msg = ChatMessage::user("Do you deliver?");
        assert_eq!(msg.role(), Role::User);
        assert!(msg.suggestions().is_empty());
    }

    #[test]
    fn test_context_drops_suggestions() {
        let mut transcript = Transcript::seeded();
        transcript.push(ChatMessage::user("Hours?"));
        transcript.push(ChatMessage::assistant_with_suggestions(
            "We open at 11am",
            vec!["View menu".into()],
        ));

        let context = transcript.context();
        assert_eq!(context.len(), 3);
        assert_eq!(context[1].role, Role::User);
        assert_eq!(context[1].content, "Hours?");
        assert_eq!(context[2].content, "We open at 11am");

        let json = serde_json::to_value(&context[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "assistant", "content": "We open at 11am"})
        );
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
