//! Theme and styling definitions for the bistro TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(28, 26, 32);
    pub const FG: Color = Color::Rgb(230, 226, 220);
    pub const DIM: Color = Color::Rgb(150, 144, 140);

    // Accent (flame orange)
    pub const ACCENT: Color = Color::Rgb(255, 140, 60);

    // Bubble backgrounds
    pub const USER_BUBBLE: Color = Color::Rgb(200, 95, 40);
    pub const ASSISTANT_BUBBLE: Color = Color::Rgb(52, 50, 60);

    // Suggestion chips
    pub const CHIP_BG: Color = Color::Rgb(40, 38, 46);
    pub const CHIP_FOCUS_BG: Color = Color::Rgb(255, 140, 60);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(45, 42, 52);
    pub const STATUS_KEY_BG: Color = Color::Rgb(120, 70, 45);

    pub const WARNING: Color = Color::Rgb(240, 200, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(80, 76, 90);
    pub const BORDER_ACTIVE: Color = Color::Rgb(255, 140, 60);
}

/// Indicator symbols (ASCII).
pub struct Symbols;

impl Symbols {
    pub const SPINNER: [&'static str; 4] = ["|", "/", "-", "\\"];
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    pub fn warning() -> Style {
        Style::default().fg(Palette::WARNING).bg(Palette::STATUS_BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Bubble holding the user's own words.
    pub fn user_bubble() -> Style {
        Style::default().fg(Palette::BG).bg(Palette::USER_BUBBLE)
    }

    /// Bubble holding an assistant reply.
    pub fn assistant_bubble() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::ASSISTANT_BUBBLE)
    }

    pub fn chip() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::CHIP_BG)
    }

    pub fn chip_focused() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::CHIP_FOCUS_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Spinner frame for the given tick count.
pub fn spinner_frame(tick: usize) -> &'static str {
    Symbols::SPINNER[tick % Symbols::SPINNER.len()]
}
