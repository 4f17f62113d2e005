//! Chat bubble widget.

use crate::text::{pad_to_width, visual_width, wrap_text};
use crate::ui::theme::Styles;
use bistro_engine::{ChatMessage, Role};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Share of the pane width a bubble may take, in percent.
pub const BUBBLE_WIDTH_PERCENT: usize = 80;

/// Horizontal padding inside a bubble, per side.
const PADDING: usize = 1;

/// One message drawn as a bubble.
///
/// User bubbles sit on the right, assistant bubbles on the left. Content is
/// shown verbatim: no markup, original line breaks kept, soft-wrapped to at
/// most [`BUBBLE_WIDTH_PERCENT`] of the pane.
#[derive(Debug, Clone, Copy)]
pub struct ChatBubble<'a> {
    message: &'a ChatMessage,
}

impl<'a> ChatBubble<'a> {
    pub fn new(message: &'a ChatMessage) -> Self {
        Self { message }
    }

    /// Widest bubble, padding included, for a pane of `pane_width` cells.
    pub fn max_width(pane_width: u16) -> usize {
        (pane_width as usize * BUBBLE_WIDTH_PERCENT / 100).max(PADDING * 2 + 1)
    }

    fn style(&self) -> Style {
        match self.message.role() {
            Role::User => Styles::user_bubble(),
            Role::Assistant => Styles::assistant_bubble(),
        }
    }

    fn alignment(&self) -> Alignment {
        match self.message.role() {
            Role::User => Alignment::Right,
            Role::Assistant => Alignment::Left,
        }
    }

    /// Lay the bubble out for a pane of `pane_width` cells.
    pub fn lines(&self, pane_width: u16) -> Vec<Line<'static>> {
        let text_width = Self::max_width(pane_width) - PADDING * 2;
        let wrapped = wrap_text(self.message.content(), text_width);
        let inner = wrapped
            .iter()
            .map(|line| visual_width(line))
            .max()
            .unwrap_or(0)
            .clamp(1, text_width);

        let pad = " ".repeat(PADDING);
        let style = self.style();
        let alignment = self.alignment();

        wrapped
            .iter()
            .map(|line| {
                let body = format!("{pad}{}{pad}", pad_to_width(line, inner));
                Line::from(Span::styled(body, style)).alignment(alignment)
            })
            .collect()
    }
}

impl Widget for ChatBubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines(area.width)).render(area, buf);
    }
}
