//! Conversation widgets: bubbles, suggestion chips and the transcript view.

mod bubble;
mod chips;
mod transcript;

pub use transcript::{ChipFocus, TranscriptView};
