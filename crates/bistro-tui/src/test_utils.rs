//! Test utilities for bistro-tui rendering and integration tests.
//!
//! Provides an in-memory backend, app constructors, and helpers that render
//! screens into a buffer and flatten it to text for assertions.

use crate::app::App;
use crate::screens::Screen;
use bistro_engine::{BackendError, ChatBackend, ChatReply, ChatRequest};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Endpoint reported by [`StubBackend`].
pub const STUB_ENDPOINT: &str = "http://stub.test";

/// Backend that answers from a queue, echoing the message once it runs dry.
#[derive(Debug, Default)]
pub struct StubBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Result<ChatReply, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Hold every answer back for `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatBackend for StubBackend {
    fn endpoint(&self) -> &str {
        STUB_ENDPOINT
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.requests.lock().unwrap().push(request.clone());

        let queued = self.replies.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(ChatReply {
                reply: Some(format!("You said: {}", request.message)),
                suggestions: Vec::new(),
            })
        })
    }
}

/// A successful reply with the given suggestions.
pub fn reply(text: &str, suggestions: &[&str]) -> Result<ChatReply, BackendError> {
    Ok(ChatReply {
        reply: Some(text.to_string()),
        suggestions: suggestions.iter().map(ToString::to_string).collect(),
    })
}

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(TEST_WIDTH, TEST_HEIGHT)).expect("Failed to create test terminal")
}

/// Create a test app backed by an echoing [`StubBackend`].
pub fn create_test_app() -> App<StubBackend> {
    App::new(StubBackend::new())
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: Screen>(screen: &S, app: &App<StubBackend>) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen to a buffer of the given size and return it as a string.
pub fn render_screen_to_string_sized<S: Screen>(
    screen: &S,
    app: &App<StubBackend>,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::chat::ChatScreen;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert_eq!(app.conversation.endpoint(), STUB_ENDPOINT);
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[test]
    fn test_render_sized() {
        let app = create_test_app();
        let out = render_screen_to_string_sized(&ChatScreen, &app, 100, 30);
        assert_eq!(out.lines().count(), 30);
    }

    #[tokio::test]
    async fn test_stub_backend_queue_then_echo() {
        let backend = StubBackend::with_replies(vec![reply("queued", &["A"])]);
        let request = ChatRequest {
            message: "Hours?".into(),
            context: Vec::new(),
        };

        let first = backend.chat(&request).await.unwrap();
        assert_eq!(first.content(), "queued");
        assert_eq!(first.suggestions, vec!["A"]);

        let second = backend.chat(&request).await.unwrap();
        assert_eq!(second.content(), "You said: Hours?");
        assert_eq!(backend.requests().len(), 2);
    }
}
