//! Layout helpers for the bistro TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the header (title, subtitle, rule).
pub const HEADER_HEIGHT: u16 = 3;

/// Height of the bordered input box.
pub const INPUT_HEIGHT: u16 = 3;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Areas of the chat screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub header: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Split the screen into header, transcript, input and status bar.
pub fn chat_layout(area: Rect) -> ChatLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    ChatLayout {
        header: chunks[0],
        transcript: chunks[1],
        input: chunks[2],
        status: chunks[3],
    }
}
