//! The chat screen: header, transcript, input box and status bar.

use crate::app::App;
use crate::conversation::TranscriptView;
use crate::screens::Screen;
use crate::ui::layout::{chat_layout, ChatLayout};
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, StatusBar};
use bistro_engine::ChatBackend;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub const TITLE: &str = "Blue Flame Bistro";
pub const SUBTITLE: &str = "Chat assistant for menu, hours, reservations and more";
pub const PLACEHOLDER: &str = "Ask about hours, menu, reservations, delivery…";

/// The only screen of the client.
pub struct ChatScreen;

impl ChatScreen {
    fn transcript_block(scrolled: bool) -> Block<'static> {
        let title = if scrolled { " Chat (scrolled) " } else { " Chat " };
        Block::default()
            .title(title)
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .style(Styles::default())
    }

    /// How far the transcript can scroll back at this screen size.
    pub fn max_scroll<B: ChatBackend>(app: &App<B>, area: Rect) -> usize {
        let ChatLayout { transcript, .. } = chat_layout(area);
        let inner = Self::transcript_block(false).inner(transcript);
        transcript_view(app).max_scroll(inner.width, inner.height)
    }
}

fn transcript_view<B: ChatBackend>(app: &App<B>) -> TranscriptView<'_> {
    TranscriptView::new(app.conversation.transcript())
        .waiting(app.is_waiting(), app.spinner())
        .chip_focus(app.chip_focus)
        .scroll_from_bottom(app.scroll_from_bottom)
}

impl Screen for ChatScreen {
    fn render<B: ChatBackend>(&self, app: &App<B>, area: Rect, buf: &mut Buffer) {
        let layout = chat_layout(area);

        render_header(layout.header, buf);

        let block = Self::transcript_block(app.scroll_from_bottom > 0);
        let inner = block.inner(layout.transcript);
        block.render(layout.transcript, buf);
        transcript_view(app).render(inner, buf);

        render_input(app, layout.input, buf);
        render_status_bar(app, layout.status, buf);
    }
}

fn render_header(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Styles::border())
        .style(Styles::default());

    Paragraph::new(vec![
        Line::from(Span::styled(format!(" {TITLE}"), Styles::title())),
        Line::from(Span::styled(format!(" {SUBTITLE}"), Styles::dim())),
    ])
    .block(block)
    .render(area, buf);
}

fn render_input<B: ChatBackend>(app: &App<B>, area: Rect, buf: &mut Buffer) {
    let waiting = app.is_waiting();
    let (title, border) = if waiting {
        (" Waiting for reply ", Styles::border())
    } else {
        (" Message ", Styles::border_active())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
        .style(Styles::default());

    app.input_state
        .widget()
        .block(block)
        .placeholder(PLACEHOLDER)
        .focused(app.chip_focus.is_none())
        .disabled(waiting)
        .render(area, buf);
}

fn render_status_bar<B: ChatBackend>(app: &App<B>, area: Rect, buf: &mut Buffer) {
    let hints = vec![
        KeyHint::new("Enter", "Send"),
        KeyHint::new("Tab", "Suggestions"),
        KeyHint::new("PgUp/PgDn", "Scroll"),
        KeyHint::new("?", "Help"),
        KeyHint::new("Esc", "Quit"),
    ];

    let backend = format!("Backend: {}", app.conversation.endpoint());
    let mut status_bar = StatusBar::new("Bistro").hints(hints);
    status_bar = match app.notification() {
        Some(notification) => status_bar.right(notification).right_style(Styles::warning()),
        None => status_bar.right(&backend),
    };
    status_bar.render(area, buf);
}
