//! Scrollable transcript view.

use super::bubble::ChatBubble;
use super::chips::SuggestionChips;
use crate::ui::theme::Styles;
use bistro_engine::{Role, Transcript};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Text of the indicator shown while a reply is outstanding.
pub const THINKING: &str = "Thinking…";

/// Position of a chip: message index in the transcript, chip index in that message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipFocus {
    pub message: usize,
    pub chip: usize,
}

/// Every message as a bubble, assistant chips beneath their bubble, and the
/// thinking indicator last.
///
/// `scroll_from_bottom` counts rows back from the newest; zero pins the view
/// to the bottom.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptView<'a> {
    transcript: &'a Transcript,
    waiting: bool,
    spinner: &'a str,
    chip_focus: Option<ChipFocus>,
    scroll_from_bottom: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self {
            transcript,
            waiting: false,
            spinner: "",
            chip_focus: None,
            scroll_from_bottom: 0,
        }
    }

    /// Show the thinking indicator with the given spinner frame.
    #[must_use]
    pub fn waiting(mut self, waiting: bool, spinner: &'a str) -> Self {
        self.waiting = waiting;
        self.spinner = spinner;
        self
    }

    #[must_use]
    pub fn chip_focus(mut self, focus: Option<ChipFocus>) -> Self {
        self.chip_focus = focus;
        self
    }

    #[must_use]
    pub fn scroll_from_bottom(mut self, rows: usize) -> Self {
        self.scroll_from_bottom = rows;
        self
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for (index, message) in self.transcript.iter().enumerate() {
            if index > 0 {
                lines.push(Line::default());
            }
            lines.extend(ChatBubble::new(message).lines(width));

            if message.role() == Role::Assistant && !message.suggestions().is_empty() {
                let focused = self
                    .chip_focus
                    .filter(|f| f.message == index)
                    .map(|f| f.chip);
                lines.extend(
                    SuggestionChips::new(message.suggestions())
                        .focused(focused)
                        .lines(width),
                );
            }
        }

        if self.waiting {
            lines.push(Line::default());
            let indicator = if self.spinner.is_empty() {
                THINKING.to_string()
            } else {
                format!("{} {THINKING}", self.spinner)
            };
            lines.push(Line::from(Span::styled(indicator, Styles::dim())));
        }

        lines
    }

    /// Furthest the view can scroll back for a pane of the given size.
    pub fn max_scroll(&self, width: u16, height: u16) -> usize {
        self.lines(width).len().saturating_sub(height as usize)
    }
}

/// First visible row when `total` rows are shown `height` at a time.
fn window_start(total: usize, height: usize, scroll_from_bottom: usize) -> usize {
    let max_scroll = total.saturating_sub(height);
    max_scroll - scroll_from_bottom.min(max_scroll)
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let lines = self.lines(area.width);
        let start = window_start(lines.len(), area.height as usize, self.scroll_from_bottom);
        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(start)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}
