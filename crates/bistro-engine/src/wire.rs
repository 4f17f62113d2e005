//! Request and reply bodies exchanged with the chat backend.

use crate::message::Role;
use serde::Serialize;
use serde_json::Value;

/// Assistant text used when the backend answers without a usable `reply`.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, something went wrong.";

/// One role-and-content pair of the outbound context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

/// Body of `POST {endpoint}/api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The trimmed text the user just sent.
    pub message: String,
    /// Full transcript so far, including `message` as its last entry.
    pub context: Vec<ContextEntry>,
}

/// Interpreted reply from the backend.
///
/// Parsing is lenient: any JSON document is accepted, and fields that are
/// missing or of the wrong type fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    /// Reply text, `None` when absent, empty or not a string.
    pub reply: Option<String>,
    /// Quick-reply suggestions; non-string entries are dropped.
    pub suggestions: Vec<String>,
}

impl ChatReply {
    /// Parse a response body. Fails only when the body is not JSON at all.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&value))
    }

    /// Interpret an already-decoded JSON document.
    pub fn from_value(value: &Value) -> Self {
        let reply = value
            .get("reply")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        let suggestions = value
            .get("suggestions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self { reply, suggestions }
    }

    /// Text to show as the assistant turn.
    pub fn content(&self) -> &str {
        self.reply.as_deref().unwrap_or(EMPTY_REPLY_FALLBACK)
    }

    /// Split into display content and suggestions.
    pub fn into_parts(self) -> (String, Vec<String>) {
        let content = self
            .reply
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
        (content, self.suggestions)
    }
}
