//! bistro-engine: Headless conversation engine for the Blue Flame Bistro chat
//!
//! This crate holds everything that does not depend on a terminal:
//! - The transcript and its message types
//! - The conversation controller and its single-flight send cycle
//! - The chat backend seam and its HTTP implementation
//! - Request and reply bodies, including lenient reply parsing
//! - Client configuration

pub mod backend;
pub mod config;
pub mod conversation;
pub mod message;
pub mod wire;

// Re-export commonly used types
pub use backend::{BackendError, ChatBackend, HttpBackend};
pub use config::{
    ClientConfig, ConfigError, CHAT_PATH, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, ENDPOINT_ENV,
};
pub use conversation::{Conversation, PendingTurn, SendOutcome, DELIVERY_FAILURE};
pub use message::{ChatMessage, Role, Transcript, GREETING};
pub use reqwest::StatusCode;
pub use wire::{ChatReply, ChatRequest, ContextEntry, EMPTY_REPLY_FALLBACK};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
