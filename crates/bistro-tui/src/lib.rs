//! bistro-tui: Terminal UI for the Blue Flame Bistro chat client
//!
//! This crate provides the interactive layer on top of `bistro-engine`:
//! - The chat screen with message bubbles and suggestion chips
//! - Keyboard and mouse handling for typing, picking chips and scrolling
//! - Headless mode for testing and automation

mod app;
mod conversation;
mod event;
pub mod headless;
mod screens;
mod task;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

pub use app::App;
pub use bistro_engine;
pub use event::{Action, Event, EventHandler};

use app::WHEEL_ROWS;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use bistro_engine::ChatBackend;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use screens::chat::ChatScreen;
use std::io::{self, stdout};
use task::{poll_finished, ChatTask};
use tracing::{debug, info};

/// Tick rate of the interactive loop (spinner and reply polling).
const TICK_RATE_MS: u64 = 100;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the interactive chat against `backend`.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit. Must be called inside a tokio runtime.
pub async fn run_tui<B: ChatBackend>(backend: B) -> Result<(), Box<dyn std::error::Error>> {
    info!(endpoint = backend.endpoint(), "Starting chat session");

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(backend);
    let mut events = EventHandler::new(TICK_RATE_MS);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;
    info!(
        messages = app.conversation.transcript().len(),
        "Chat session ended"
    );

    result
}

async fn run_loop<B: ChatBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<B>,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    // At most one request is ever outstanding
    let mut chat_task: Option<ChatTask> = None;

    loop {
        if let Some((seq, result)) = poll_finished(&mut chat_task).await {
            app.finish_turn(seq, result);
        }

        let size = terminal.size()?;
        app.clamp_scroll(ChatScreen::max_scroll(
            app,
            Rect::new(0, 0, size.width, size.height),
        ));

        terminal.draw(|frame| {
            screens::render_app(app, frame.area(), frame.buffer_mut());
        })?;

        if app.should_quit {
            if let Some(task) = chat_task.take() {
                debug!(seq = task.seq(), "Abandoning outstanding chat request");
                task.abort();
            }
            break;
        }

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(turn) = app.handle_key(key) {
                        chat_task = Some(ChatTask::spawn(app.conversation.backend(), turn));
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll_up(WHEEL_ROWS),
                    MouseEventKind::ScrollDown => app.scroll_down(WHEEL_ROWS),
                    _ => {}
                },
                Event::Paste(text) => app.handle_paste(&text),
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Next draw picks up the new size
                }
            }
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
