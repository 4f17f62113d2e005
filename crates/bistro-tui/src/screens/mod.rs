//! Screen definitions for the bistro TUI.

pub mod chat;

use crate::app::App;
use bistro_engine::ChatBackend;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render<B: ChatBackend>(&self, app: &App<B>, area: Rect, buf: &mut Buffer);
}

/// Draw everything for one frame: the chat screen and, if open, the help overlay.
pub fn render_app<B: ChatBackend>(app: &App<B>, area: Rect, buf: &mut Buffer) {
    chat::ChatScreen.render(app, area, buf);
    if app.show_help {
        render_help_overlay(area, buf);
    }
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let help_text = r"
  Chat
    Enter             Send message / chosen suggestion
    Tab / Shift+Tab   Choose a suggestion
    Up / Down         Previous inputs (or scroll)
    PgUp / PgDn       Scroll the conversation
    Esc               Clear choice, or quit
    Ctrl+C            Quit
    ?                 Toggle this help

  [Press any key to close]
";

    let width = 56.min(area.width.saturating_sub(4));
    let height = 14.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(help_text)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}
