//! # MessageList Component
//!
//! Scrollable view of the active session's thread.
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent scroll state) and the messages
//! (props). The list sticks to the bottom until the user scrolls up, and
//! re-pins when they scroll back down to the end.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::Message;
use crate::core::state::ChatStatus;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Rows reserved under the thread for the busy indicator.
const INDICATOR_ROWS: u16 = 2;

/// Scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Canvas height from the last render
    pub content_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_state.scroll_to_bottom();
    }
}

/// Scrollable conversation view component.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub status: ChatStatus,
    pub palette: Palette,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        status: ChatStatus,
        palette: Palette,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            status,
            palette,
            spinner_frame,
        }
    }

    fn indicator(&self) -> Option<Line<'static>> {
        let label = match self.status {
            ChatStatus::Idle => return None,
            ChatStatus::Sending => "Thinking...",
            ChatStatus::LoadingSession => "Loading chat...",
        };
        let frame = SPINNER[self.spinner_frame % SPINNER.len()];
        Some(Line::from(vec![
            Span::styled(format!("{frame} "), Style::default().fg(self.palette.accent)),
            Span::styled(
                label,
                Style::default().fg(self.palette.muted).add_modifier(Modifier::ITALIC),
            ),
        ]))
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let indicator = self.indicator();

        // Nothing to show yet: center the indicator instead of an empty canvas
        if self.messages.is_empty() {
            if let Some(line) = indicator {
                let y = area.y + area.height / 2;
                let row = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
                frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
            }
            self.state.content_height = 0;
            return;
        }

        let bubbles: Vec<MessageBubble> = self
            .messages
            .iter()
            .map(|m| MessageBubble::new(m, &self.palette))
            .collect();
        let heights: Vec<u16> = bubbles.iter().map(|b| b.height(content_width)).collect();
        let thread_height: u16 = heights.iter().sum();
        let canvas_height = thread_height + if indicator.is_some() { INDICATOR_ROWS } else { 0 };

        self.state.viewport_height = area.height;
        self.state.content_height = canvas_height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (bubble, height) in bubbles.into_iter().zip(heights) {
            scroll_view.render_widget(bubble, Rect::new(0, y, content_width, height));
            y += height;
        }
        if let Some(line) = indicator {
            scroll_view.render_widget(Paragraph::new(line), Rect::new(1, y + 1, content_width.saturating_sub(1), 1));
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the state: scrolling must outlive the per-frame wrapper.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut MessageListState, messages: &[Message], status: ChatStatus) -> String {
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        let palette = Palette::for_theme(Theme::Dark);
        terminal
            .draw(|f| {
                MessageList::new(state, messages, status, palette, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn shows_thinking_indicator_while_sending() {
        let mut state = MessageListState::new();
        let messages = vec![Message::user("What is zakat?")];
        let text = draw(&mut state, &messages, ChatStatus::Sending);
        assert!(text.contains("What is zakat?"));
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn loading_empty_thread_centers_indicator() {
        let mut state = MessageListState::new();
        let text = draw(&mut state, &[], ChatStatus::LoadingSession);
        assert!(text.contains("Loading chat..."));
    }

    #[test]
    fn idle_has_no_indicator() {
        let mut state = MessageListState::new();
        let messages = vec![Message::bot("Salam")];
        let text = draw(&mut state, &messages, ChatStatus::Idle);
        assert!(!text.contains("Thinking"));
        assert_eq!(state.content_height, 3);
    }

    #[test]
    fn scrolling_up_unpins_and_bottom_repins() {
        let mut state = MessageListState::new();
        let messages: Vec<Message> = (0..10).map(|i| Message::user(format!("question {i}"))).collect();
        draw(&mut state, &messages, ChatStatus::Idle);
        assert!(state.content_height > state.viewport_height);

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        for _ in 0..50 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }
}
