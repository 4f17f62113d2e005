//! The conversation controller.
//!
//! [`Conversation`] owns the transcript, the pending input and the in-flight
//! flag, and is the only thing that mutates them. A send is split in two
//! halves so an event loop can keep drawing while the request is out:
//!
//! 1. [`Conversation::begin_send`] runs synchronously: it clears the input,
//!    appends the user turn, marks the request outstanding and hands back a
//!    [`PendingTurn`] carrying the outbound payload.
//! 2. [`Conversation::complete`] is fed the backend result for that turn and
//!    appends exactly one assistant turn.
//!
//! Only one request may be outstanding. A second send while waiting is
//! refused with [`SendOutcome::Busy`], and a completion tagged with any
//! sequence number other than the outstanding one is dropped.

use crate::backend::{BackendError, ChatBackend};
use crate::message::{ChatMessage, Transcript};
use crate::wire::{ChatReply, ChatRequest};
use std::sync::Arc;
use tracing::{debug, warn};

/// Assistant text appended when a request fails for any reason.
pub const DELIVERY_FAILURE: &str = "Unable to reach the server. Please try again.";

/// A request that has been started and awaits its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// Sequence number to pass back to [`Conversation::complete`].
    pub seq: u64,
    /// Payload for the backend.
    pub request: ChatRequest,
}

/// What [`Conversation::begin_send`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Trimmed text was empty; nothing changed.
    Ignored,
    /// A request is already outstanding; nothing changed.
    Busy,
    /// The user turn was appended and a request must now be issued.
    Started(PendingTurn),
}

impl SendOutcome {
    /// The started turn, if any.
    pub fn into_turn(self) -> Option<PendingTurn> {
        match self {
            SendOutcome::Started(turn) => Some(turn),
            SendOutcome::Ignored | SendOutcome::Busy => None,
        }
    }
}

/// Controller for one chat session.
#[derive(Debug)]
pub struct Conversation<B> {
    transcript: Transcript,
    pending_input: String,
    in_flight: Option<u64>,
    next_seq: u64,
    backend: Arc<B>,
}

impl<B: ChatBackend> Conversation<B> {
    /// Start a session against `backend`, seeded with the greeting.
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            transcript: Transcript::seeded(),
            pending_input: String::new(),
            in_flight: None,
            next_seq: 1,
            backend,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    /// True while exactly one request is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sequence number of the outstanding request.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Backend base URL, fixed for the controller's lifetime.
    pub fn endpoint(&self) -> &str {
        self.backend.endpoint()
    }

    /// Shared handle to the backend, for dispatching a [`PendingTurn`].
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// Start a send of `text`, or of the pending input when `text` is `None`.
    pub fn begin_send(&mut self, text: Option<&str>) -> SendOutcome {
        let message = text.unwrap_or(&self.pending_input).trim().to_string();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        if let Some(seq) = self.in_flight {
            debug!(outstanding = seq, "Send refused while a request is outstanding");
            return SendOutcome::Busy;
        }

        self.pending_input.clear();
        self.transcript.push(ChatMessage::user(message.clone()));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);

        let request = ChatRequest {
            message,
            context: self.transcript.context(),
        };
        debug!(seq, context_len = request.context.len(), "Chat turn started");

        SendOutcome::Started(PendingTurn { seq, request })
    }

    /// Record the result of turn `seq`.
    ///
    /// Returns `false` when `seq` is not the outstanding request; the result
    /// is then discarded.
    pub fn complete(&mut self, seq: u64, result: Result<ChatReply, BackendError>) -> bool {
        if self.in_flight != Some(seq) {
            warn!(seq, outstanding = ?self.in_flight, "Discarding stale chat result");
            return false;
        }

        let message = match result {
            Ok(reply) => {
                let (content, suggestions) = reply.into_parts();
                debug!(seq, suggestions = suggestions.len(), "Chat turn completed");
                ChatMessage::assistant_with_suggestions(content, suggestions)
            }
            Err(e) => {
                warn!(seq, error = %e, "Chat request failed");
                ChatMessage::assistant(DELIVERY_FAILURE)
            }
        };

        self.transcript.push(message);
        self.in_flight = None;
        true
    }

    /// Run a whole round-trip: begin, await the backend, complete.
    ///
    /// Never fails; delivery problems become the fallback assistant turn.
    /// Returns `true` when a round-trip took place.
    pub async fn send_message(&mut self, text: Option<&str>) -> bool {
        let Some(turn) = self.begin_send(text).into_turn() else {
            return false;
        };

        let backend = self.backend();
        let result = backend.chat(&turn.request).await;
        self.complete(turn.seq, result)
    }

    /// Send a suggestion chip's label as if it had been typed.
    pub async fn pick_suggestion(&mut self, suggestion: &str) -> bool {
        self.send_message(Some(suggestion)).await
    }
}
