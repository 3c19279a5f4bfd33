//! # Application State
//!
//! Core state for the client. Domain data only: no terminal types. The
//! presentation state (scroll offsets, input buffer, sidebar cursor) lives
//! in the `tui` module.
//!
//! ```text
//! App
//! ├── messages: Vec<Message>          // active session's thread
//! ├── chat: ChatStatus                // Idle | Sending | LoadingSession
//! ├── sessions: Vec<Session>          // sidebar list, most recent first
//! ├── sessions_loading: bool          // list fetch outstanding
//! ├── current_session_id: Option      // the one "current" session
//! ├── session_request: u64            // latest get_session token
//! ├── creating_session: bool          // create_session outstanding
//! ├── pending_ask: Option<PendingAsk> // ask outstanding, in any session
//! ├── ask_request: u64                // latest ask token
//! ├── user: Option<User>              // signed-in user
//! ├── status_message: String          // title bar text
//! ├── theme: Theme                    // dark/light flag
//! └── layout: Layout                  // width, breakpoint, sidebar flag
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use serde::{Deserialize, Serialize};

use crate::api::{Message, Session, User};

/// First bot message of a session with no history.
pub const GREETING: &str = "As-salamu alaykum! I'm your Islamic AI assistant. I can answer questions based on Quran, Hadith, and authentic Islamic sources. How can I help you today?";

/// Shown in place of an answer when the ask call fails.
pub const FALLBACK_ANSWER: &str = "As-salamu alaykum. I apologize, but I'm having trouble connecting to the knowledge base. Please try again later or consult with a local scholar.";

pub const DEFAULT_MOBILE_BREAKPOINT: u16 = 100;

/// Chat pane lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatStatus {
    #[default]
    Idle,
    /// An ask call is in flight.
    Sending,
    /// The active session's messages are being fetched.
    LoadingSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// An ask call that has not answered yet. Outlives session switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsk {
    pub session_id: String,
    pub token: u64,
}

/// Responsive layout state, derived from the terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub is_mobile: bool,
    pub sidebar_open: bool,
    /// Widths below this count as a small viewport.
    pub mobile_breakpoint: u16,
}

impl Layout {
    pub fn new(width: u16, mobile_breakpoint: u16) -> Self {
        let is_mobile = width < mobile_breakpoint;
        Self {
            width,
            is_mobile,
            sidebar_open: !is_mobile,
            mobile_breakpoint,
        }
    }

    /// Recompute the breakpoint: small closes the sidebar, large opens it.
    pub fn resize(&mut self, width: u16) {
        self.width = width;
        self.is_mobile = width < self.mobile_breakpoint;
        self.sidebar_open = !self.is_mobile;
    }
}

pub struct App {
    pub messages: Vec<Message>,
    pub chat: ChatStatus,
    pub sessions: Vec<Session>,
    pub sessions_loading: bool,
    pub current_session_id: Option<String>,
    /// Token of the most recent `get_session` request; older responses are dropped.
    pub session_request: u64,
    pub creating_session: bool,
    pub pending_ask: Option<PendingAsk>,
    pub ask_request: u64,
    pub user: Option<User>,
    pub status_message: String,
    pub theme: Theme,
    pub layout: Layout,
}

impl App {
    pub fn new(theme: Theme, layout: Layout) -> Self {
        Self {
            messages: vec![Message::bot(GREETING)],
            chat: ChatStatus::Idle,
            sessions: Vec::new(),
            sessions_loading: false,
            current_session_id: None,
            session_request: 0,
            creating_session: false,
            pending_ask: None,
            ask_request: 0,
            user: None,
            status_message: String::from("Welcome!"),
            theme,
            layout,
        }
    }

    /// True while the pane is loading or any answer is outstanding.
    pub fn is_busy(&self) -> bool {
        self.chat != ChatStatus::Idle || self.pending_ask.is_some()
    }

    pub fn current_session(&self) -> Option<&Session> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Replace the thread, seeding the greeting when the session is empty.
    pub fn show_messages(&mut self, messages: Vec<Message>) {
        self.messages = if messages.is_empty() {
            vec![Message::bot(GREETING)]
        } else {
            messages
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.chat, ChatStatus::Idle);
        assert!(app.current_session_id.is_none());
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::Bot);
        assert_eq!(app.messages[0].content, GREETING);
    }

    #[test]
    fn layout_breakpoint() {
        let wide = Layout::new(140, DEFAULT_MOBILE_BREAKPOINT);
        assert!(!wide.is_mobile);
        assert!(wide.sidebar_open);

        let mut layout = Layout::new(60, DEFAULT_MOBILE_BREAKPOINT);
        assert!(layout.is_mobile);
        assert!(!layout.sidebar_open);

        layout.resize(120);
        assert!(!layout.is_mobile);
        assert!(layout.sidebar_open);
    }

    #[test]
    fn show_messages_seeds_greeting() {
        let mut app = test_app();
        app.show_messages(vec![]);
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].content, GREETING);

        app.show_messages(vec![Message::user("q"), Message::bot("a")]);
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().label(), "light");
    }
}
