//! Headless mode for the bistro TUI.
//!
//! Runs the full event loop against an in-memory terminal. Keys are sent
//! through a channel and the rendered screen is published after every frame,
//! which makes the client drivable from tests and scripts.

use crate::app::App;
use crate::screens::{chat::ChatScreen, render_app};
use crate::task::{poll_finished, ChatTask};
use bistro_engine::ChatBackend;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Whether a reply is outstanding.
    pub waiting: bool,
    /// Number of messages in the transcript.
    pub transcript_len: usize,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    key_tx: mpsc::UnboundedSender<KeyEvent>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send a key event. Returns `true` if the loop is still listening.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.key_tx.send(key).is_ok()
    }

    /// Press a key without modifiers.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Type text one character at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop has exited
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(backend, HeadlessConfig::default());
///
/// handle.type_text("When do you open?");
/// handle.press(KeyCode::Enter);
/// handle.wait_for_text("11am", Duration::from_secs(1)).await;
///
/// handle.press(KeyCode::Esc);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless<B: ChatBackend>(
    backend: B,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(App::new(backend), config, key_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { key_tx, state_rx }, task)
}

async fn run_headless_loop<B: ChatBackend>(
    mut app: App<B>,
    config: HeadlessConfig,
    mut key_rx: mpsc::UnboundedReceiver<KeyEvent>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut terminal = Terminal::new(TestBackend::new(config.width, config.height))?;
    let tick_duration = std::time::Duration::from_millis(config.tick_rate_ms);
    let mut chat_task: Option<ChatTask> = None;

    loop {
        if let Some((seq, result)) = poll_finished(&mut chat_task).await {
            app.finish_turn(seq, result);
        }

        let area = ratatui::layout::Rect::new(0, 0, config.width, config.height);
        app.clamp_scroll(ChatScreen::max_scroll(&app, area));
        terminal.draw(|frame| render_app(&app, frame.area(), frame.buffer_mut()))?;

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            waiting: app.is_waiting(),
            transcript_len: app.conversation.transcript().len(),
        });

        if app.should_quit {
            if let Some(task) = chat_task.take() {
                task.abort();
            }
            break;
        }

        tokio::select! {
            Some(key) = key_rx.recv() => {
                if let Some(turn) = app.handle_key(key) {
                    chat_task = Some(ChatTask::spawn(app.conversation.backend(), turn));
                }
            }
            () = tokio::time::sleep(tick_duration) => app.tick(),
        }
    }

    Ok(())
}

/// Convert a terminal buffer to a string, one row per line, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
