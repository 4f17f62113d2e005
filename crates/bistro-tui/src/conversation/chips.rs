//! Suggestion chip row.

use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Label of one chip as drawn.
pub fn chip_label(suggestion: &str) -> String {
    format!("[ {suggestion} ]")
}

/// The quick-reply chips of one assistant message.
///
/// Chips flow left to right and wrap onto further rows. An empty list draws
/// nothing.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionChips<'a> {
    suggestions: &'a [String],
    focused: Option<usize>,
}

impl<'a> SuggestionChips<'a> {
    pub fn new(suggestions: &'a [String]) -> Self {
        Self {
            suggestions,
            focused: None,
        }
    }

    /// Highlight the chip at `index`.
    #[must_use]
    pub fn focused(mut self, index: Option<usize>) -> Self {
        self.focused = index;
        self
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        let mut lines = Vec::new();
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut row_width = 0;

        for (i, suggestion) in self.suggestions.iter().enumerate() {
            let label = truncate_to_width(&chip_label(suggestion), width.max(1));
            let label_width = visual_width(&label);
            let style = if self.focused == Some(i) {
                Styles::chip_focused()
            } else {
                Styles::chip()
            };

            let gap = usize::from(!row.is_empty());
            if !row.is_empty() && row_width + gap + label_width > width {
                lines.push(Line::from(std::mem::take(&mut row)));
                row_width = 0;
            } else if gap > 0 {
                row.push(Span::raw(" "));
                row_width += 1;
            }

            row.push(Span::styled(label, style));
            row_width += label_width;
        }

        if !row.is_empty() {
            lines.push(Line::from(row));
        }
        lines
    }
}

impl Widget for SuggestionChips<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(area.width);
        if lines.is_empty() {
            return;
        }
        Paragraph::new(lines).render(area, buf);
    }
}
