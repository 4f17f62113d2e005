//! Single-line text input widget.

use crate::text::visual_width;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// A single-line text input widget.
///
/// The view scrolls horizontally so the cursor is always visible.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    /// Cursor position (character index).
    cursor: usize,
    block: Option<Block<'a>>,
    focused: bool,
    disabled: bool,
    placeholder: Option<&'a str>,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    /// Create a new text input.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cursor: content.chars().count(),
            block: None,
            focused: true,
            disabled: false,
            placeholder: None,
            prompt: "> ",
        }
    }

    /// Set the block for the text input.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Dim the content; the cursor is hidden.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn show_cursor(&self) -> bool {
        self.focused && !self.disabled
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let prompt_style = if self.disabled {
            Styles::dim()
        } else {
            Styles::active()
        };
        let text_style = if self.disabled {
            Styles::dim()
        } else {
            Styles::default()
        };

        let mut spans = vec![Span::styled(self.prompt, prompt_style)];

        if self.content.is_empty() {
            if self.show_cursor() {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        // Room for the text itself, keeping one cell for the cursor
        let room = (inner.width as usize)
            .saturating_sub(visual_width(self.prompt))
            .saturating_sub(1)
            .max(1);

        let chars: Vec<char> = self.content.chars().collect();
        let cursor = self.cursor.min(chars.len());

        // Scroll so the cursor sits inside the visible window
        let mut start = 0;
        let mut width_before_cursor: usize = chars[..cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        while width_before_cursor > room && start < cursor {
            width_before_cursor -= chars[start].width().unwrap_or(0);
            start += 1;
        }

        let before: String = chars[start..cursor].iter().collect();
        let after: String = chars[cursor..].iter().collect();

        spans.push(Span::styled(before, text_style));
        if self.show_cursor() {
            let marker = if after.is_empty() { "_" } else { "|" };
            spans.push(Span::styled(marker, Styles::active()));
        }
        spans.push(Span::styled(after, text_style));

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

/// State for a text input, managing content and cursor position.
///
/// The cursor is a character index, so editing is safe for any UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Submitted inputs, oldest first.
    history: Vec<String>,
    /// Position while browsing history, counted back from the newest entry.
    history_index: Option<usize>,
    /// Input saved when history browsing started.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    /// True while Up/Down are walking through submitted inputs.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    /// Clear the content without recording it in history.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the content into history and clear.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Step back to an older history entry.
    pub fn history_prev(&mut self) {
        let next = match self.history_index {
            None => 0,
            Some(i) => i + 1,
        };
        if next >= self.history.len() {
            return;
        }

        if self.history_index.is_none() {
            self.saved_input = self.content.clone();
        }
        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Step forward to a newer history entry, restoring the saved input at the end.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_input);
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
                self.move_end();
            }
        }
    }

    /// Create a widget from this state.
    pub fn widget(&self) -> TextInput<'_> {
        let mut input = TextInput::new(&self.content);
        input.cursor = self.cursor;
        input
    }
}
