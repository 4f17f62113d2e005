//! Status bar widget.

use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
    right_style: Style,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            right_style: Styles::status_bar(),
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }

    #[must_use]
    pub fn right_style(mut self, style: Style) -> Self {
        self.right_style = style;
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        // Right side first so the hints never hide it
        let mut right_width = 0;
        if let Some(text) = self.right_text {
            let max = (area.width as usize).saturating_sub(2);
            let text = truncate_to_width(text, max);
            right_width = visual_width(&text) as u16;
            if right_width > 0 {
                let x = area.x + area.width - right_width - 1;
                buf.set_string(x, area.y, &text, self.right_style);
            }
        }

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
            ),
            Span::styled(" ", Styles::status_bar()),
        ];
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(
                format!(" {} ", hint.label),
                Styles::key_label(),
            ));
        }

        let left_width = area
            .width
            .saturating_sub(right_width)
            .saturating_sub(if right_width > 0 { 2 } else { 0 });
        buf.set_line(area.x, area.y, &Line::from(spans), left_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(bar: StatusBar<'_>, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_status_bar_shows_mode_hints_and_right_text() {
        let bar = StatusBar::new("Chat")
            .hints(vec![KeyHint::new("Enter", "Send")])
            .right("Backend: http://localhost:8000");
        let out = render(bar, 80);
        assert!(out.starts_with(" Chat "));
        assert!(out.contains("Enter"));
        assert!(out.contains("Send"));
        assert!(out.ends_with("Backend: http://localhost:8000"));
    }

    #[test]
    fn test_right_text_wins_over_hints_when_narrow() {
        let bar = StatusBar::new("Chat")
            .hints(vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "Suggestions"),
            ])
            .right("Backend: http://localhost:8000");
        let out = render(bar, 40);
        assert!(out.contains("Backend: http://localhost:8000"));
        assert!(!out.contains("Suggestions"));
    }

    #[test]
    fn test_right_text_truncated_on_tiny_width() {
        let out = render(StatusBar::new("Chat").right("Backend: http://localhost:8000"), 12);
        assert!(out.contains("..."));
    }
}
