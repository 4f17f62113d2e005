//! Application state and update logic for the bistro TUI.

use crate::conversation::ChipFocus;
use crate::event::{key_to_action, Action};
use crate::ui::theme::spinner_frame;
use crate::ui::widgets::TextInputState;
use bistro_engine::{
    BackendError, ChatBackend, ChatReply, Conversation, PendingTurn, SendOutcome,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a status bar notification stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Rows moved by PageUp/PageDown.
pub const PAGE_ROWS: usize = 10;

/// Rows moved per mouse wheel notch.
pub const WHEEL_ROWS: usize = 3;

/// Shown when Enter is pressed while a reply is outstanding.
pub const BUSY_NOTICE: &str = "Still waiting for the last reply";

/// Application state.
#[derive(Debug)]
pub struct App<B> {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// The chat session. Owns the transcript and the in-flight flag.
    pub conversation: Conversation<B>,

    /// Text being typed.
    pub input_state: TextInputState,

    /// Chip selected with Tab/Shift+Tab, if any.
    pub chip_focus: Option<ChipFocus>,

    /// Transcript rows scrolled back from the newest; zero follows the bottom.
    pub scroll_from_bottom: usize,

    /// Tick counter for the spinner.
    pub tick_count: usize,

    /// Transient status bar message and when it was set.
    notification: Option<(String, Instant)>,
}

impl<B: ChatBackend> App<B> {
    pub fn new(backend: B) -> Self {
        Self::with_conversation(Conversation::new(backend))
    }

    pub fn with_conversation(conversation: Conversation<B>) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            conversation,
            input_state: TextInputState::new(),
            chip_focus: None,
            scroll_from_bottom: 0,
            tick_count: 0,
            notification: None,
        }
    }

    /// Handle a key press.
    ///
    /// Returns the turn to dispatch when the key started a send.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingTurn> {
        if self.show_help {
            // Any key closes help; Ctrl+C still quits
            if key_to_action(key) == Action::Quit {
                self.should_quit = true;
            }
            self.show_help = false;
            return None;
        }

        if self.handle_input_key(key) {
            return None;
        }

        self.handle_action(key_to_action(key))
    }

    /// Editing keys for the input box. Returns true if the key was consumed.
    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }

        let input = &mut self.input_state;
        match key.code {
            // Help is only reachable from an empty input
            KeyCode::Char('?') if input.is_empty() => return false,
            KeyCode::Char(c) => {
                input.insert(c);
                self.chip_focus = None;
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            KeyCode::Up
                if input.is_browsing_history() || (input.is_empty() && input.has_history()) =>
            {
                input.history_prev();
            }
            KeyCode::Down if input.is_browsing_history() => input.history_next(),
            _ => return false,
        }
        true
    }

    /// Insert pasted text into the input. Line breaks become spaces.
    pub fn handle_paste(&mut self, text: &str) {
        if self.show_help {
            return;
        }
        let flattened: String = text
            .chars()
            .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
            .collect();
        self.input_state.insert_str(&flattened);
        self.chip_focus = None;
    }

    /// Apply an action. Returns the turn to dispatch when a send started.
    pub fn handle_action(&mut self, action: Action) -> Option<PendingTurn> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = !self.show_help,
            Action::Back => {
                if self.chip_focus.take().is_none() {
                    self.should_quit = true;
                }
            }
            Action::Select => {
                return if self.chip_focus.is_some() {
                    self.pick_focused_suggestion()
                } else {
                    self.submit()
                };
            }
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_ROWS),
            Action::PageDown => self.scroll_down(PAGE_ROWS),
            Action::NextChip => self.next_chip(),
            Action::PrevChip => self.prev_chip(),
            Action::None => {}
        }
        None
    }

    /// Send whatever is in the input box.
    ///
    /// The input keeps its text when nothing was sent.
    pub fn submit(&mut self) -> Option<PendingTurn> {
        self.conversation
            .set_pending_input(self.input_state.content());
        let outcome = self.conversation.begin_send(None);
        let turn = self.accept(outcome)?;
        self.input_state.submit();
        Some(turn)
    }

    /// Send a suggestion as if it had been typed. Clears the input box.
    pub fn pick_suggestion(&mut self, suggestion: &str) -> Option<PendingTurn> {
        let outcome = self.conversation.begin_send(Some(suggestion));
        let turn = self.accept(outcome)?;
        self.input_state.clear();
        Some(turn)
    }

    fn pick_focused_suggestion(&mut self) -> Option<PendingTurn> {
        let suggestion = self.focused_suggestion()?.to_string();
        self.pick_suggestion(&suggestion)
    }

    fn accept(&mut self, outcome: SendOutcome) -> Option<PendingTurn> {
        match outcome {
            SendOutcome::Started(turn) => {
                self.chip_focus = None;
                self.scroll_to_bottom();
                Some(turn)
            }
            SendOutcome::Busy => {
                self.set_notification(BUSY_NOTICE);
                None
            }
            SendOutcome::Ignored => None,
        }
    }

    /// Feed back the result of a dispatched turn.
    pub fn finish_turn(&mut self, seq: u64, result: Result<ChatReply, BackendError>) {
        if self.conversation.complete(seq, result) {
            self.scroll_to_bottom();
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.conversation.is_waiting()
    }

    /// All chips in transcript order.
    fn chip_positions(&self) -> Vec<ChipFocus> {
        self.conversation
            .transcript()
            .iter()
            .enumerate()
            .flat_map(|(message, msg)| {
                (0..msg.suggestions().len()).map(move |chip| ChipFocus { message, chip })
            })
            .collect()
    }

    /// First chip of the newest message that has any.
    fn newest_first_chip(chips: &[ChipFocus]) -> Option<ChipFocus> {
        let newest = chips.last()?.message;
        chips.iter().find(|c| c.message == newest).copied()
    }

    pub fn next_chip(&mut self) {
        self.step_chip(true);
    }

    pub fn prev_chip(&mut self) {
        self.step_chip(false);
    }

    fn step_chip(&mut self, forward: bool) {
        let chips = self.chip_positions();
        let current = self
            .chip_focus
            .and_then(|focus| chips.iter().position(|c| *c == focus));

        self.chip_focus = match current {
            Some(i) if forward => chips.get((i + 1) % chips.len()).copied(),
            Some(i) => chips.get((i + chips.len() - 1) % chips.len()).copied(),
            None => Self::newest_first_chip(&chips),
        };
    }

    /// Label of the focused chip.
    pub fn focused_suggestion(&self) -> Option<&str> {
        let focus = self.chip_focus?;
        self.conversation
            .transcript()
            .messages()
            .get(focus.message)?
            .suggestions()
            .get(focus.chip)
            .map(String::as_str)
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Keep the scroll offset within what the current layout can show.
    pub fn clamp_scroll(&mut self, max_scroll: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_scroll);
    }

    fn set_notification(&mut self, msg: &str) {
        debug!(notification = msg, "Status notification");
        self.notification = Some((msg.to_string(), Instant::now()));
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// Called on each tick (for animations and notification expiry).
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);

        if let Some((_, set_at)) = &self.notification {
            if set_at.elapsed() >= NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    pub fn spinner(&self) -> &'static str {
        spinner_frame(self.tick_count)
    }
}
