//! # Actions
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::AnswerReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the effects to run. No I/O happens here: effects
//! are executed by `core::effects` (network) or the event loop (local).
//!
//! ```text
//! State + Action  →  update()  →  New State + Vec<Effect>
//! ```
//!
//! ## Shell reconciliation
//!
//! Every refreshed session list goes through the same rule, and applying it
//! twice to the same backend state is a no-op:
//!
//! 1. sort most recent first;
//! 2. forget the current id if the list no longer contains it;
//! 3. no current + non-empty list → select the first session;
//! 4. no current + empty list → create one session (unless a create is
//!    already in flight).

use log::{debug, info, warn};

use crate::api::{Message, Session, User};
use crate::core::sidebar::sort_by_recency;
use crate::core::state::{App, ChatStatus, FALLBACK_ANSWER, PendingAsk, Theme};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// App start: load the user and the session list.
    Start,
    RefreshSessions,
    SessionsLoaded(Vec<Session>),
    /// Result of a create call; `None` when the backend refused.
    SessionCreated(Option<String>),
    SelectSession(String),
    NewChat,
    /// A confirmed delete from the sidebar.
    DeleteSession(String),
    SessionDeleted { id: String, ok: bool },
    /// Result of a `get_session` call, tagged with its request token.
    SessionLoaded { token: u64, session: Option<Session> },
    Submit(String),
    AnswerReceived {
        /// Token of the ask this answers.
        token: u64,
        /// The session the question was asked in.
        asked_in: String,
        answer: String,
        session_id: Option<String>,
    },
    AskFailed { token: u64, asked_in: String },
    UserLoaded(User),
    /// Any backend call was rejected with 401.
    Unauthorized,
    ToggleTheme,
    ToggleSidebar,
    CloseSidebar,
    /// Debounced terminal width change.
    Resize(u16),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchUser,
    FetchSessions,
    CreateSession,
    FetchSession { id: String, token: u64 },
    Ask {
        question: String,
        session_id: String,
        token: u64,
    },
    DeleteSession(String),
    MirrorUser(User),
    PersistTheme(Theme),
    SignOut,
    Quit,
}

impl Effect {
    /// Effects the event loop handles itself instead of sending to the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Effect::MirrorUser(_) | Effect::PersistTheme(_) | Effect::SignOut | Effect::Quit
        )
    }
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Start => {
            app.sessions_loading = true;
            vec![Effect::FetchUser, Effect::FetchSessions]
        }
        Action::RefreshSessions => {
            app.sessions_loading = true;
            vec![Effect::FetchSessions]
        }
        Action::SessionsLoaded(sessions) => reconcile(app, sessions),
        Action::SessionCreated(Some(id)) => {
            info!("Session created: {}", id);
            app.creating_session = false;
            app.current_session_id = Some(id);
            // A new session has nothing to fetch
            app.session_request += 1;
            app.chat = ChatStatus::Idle;
            app.show_messages(Vec::new());
            app.status_message = String::from("New chat");
            vec![Effect::FetchSessions]
        }
        Action::SessionCreated(None) => {
            app.creating_session = false;
            app.status_message = String::from("Could not start a new chat");
            Vec::new()
        }
        Action::SelectSession(id) => {
            close_sidebar_on_mobile(app);
            if app.current_session_id.as_deref() == Some(id.as_str()) {
                return Vec::new();
            }
            select(app, id)
        }
        Action::NewChat => {
            close_sidebar_on_mobile(app);
            if app.creating_session {
                return Vec::new();
            }
            app.creating_session = true;
            vec![Effect::CreateSession]
        }
        Action::DeleteSession(id) => vec![Effect::DeleteSession(id)],
        Action::SessionDeleted { id, ok } => {
            if ok {
                app.status_message = String::from("Chat deleted");
                if app.current_session_id.as_deref() == Some(id.as_str()) {
                    app.current_session_id = None;
                    app.session_request += 1;
                    app.chat = ChatStatus::Idle;
                    app.messages.clear();
                }
            } else {
                app.status_message = String::from("Could not delete chat");
            }
            app.sessions_loading = true;
            vec![Effect::FetchSessions]
        }
        Action::SessionLoaded { token, session } => {
            if token != app.session_request {
                debug!("Discarding stale session response (token {} != {})", token, app.session_request);
                return Vec::new();
            }
            app.chat = ChatStatus::Idle;
            match session {
                Some(session) => {
                    app.show_messages(session.messages.unwrap_or_default());
                }
                None => {
                    app.show_messages(Vec::new());
                    app.status_message = String::from("Could not load chat history");
                }
            }
            Vec::new()
        }
        Action::Submit(text) => submit(app, text),
        Action::AnswerReceived {
            token,
            asked_in,
            answer,
            session_id,
        } => {
            if !take_pending_ask(app, token) {
                return Vec::new();
            }
            app.status_message.clear();
            let mut effects = Vec::new();
            if app.current_session_id.as_deref() == Some(asked_in.as_str()) {
                if app.chat == ChatStatus::Sending {
                    app.messages.push(Message::bot(answer));
                    app.chat = ChatStatus::Idle;
                    if let Some(sid) = session_id.filter(|sid| *sid != asked_in) {
                        info!("Backend moved conversation {} to session {}", asked_in, sid);
                        app.current_session_id = Some(sid);
                    }
                } else {
                    // The thread was reloaded while the answer was pending
                    debug!("Answer for {} arrived after a reload, fetching it", asked_in);
                    effects = select(app, asked_in);
                }
            } else {
                debug!("Answer for {} arrived after switching away", asked_in);
            }
            app.sessions_loading = true;
            effects.push(Effect::FetchSessions);
            effects
        }
        Action::AskFailed { token, asked_in } => {
            if !take_pending_ask(app, token) {
                return Vec::new();
            }
            if app.current_session_id.as_deref() == Some(asked_in.as_str())
                && app.chat == ChatStatus::Sending
            {
                app.messages.push(Message::bot(FALLBACK_ANSWER));
                app.chat = ChatStatus::Idle;
                app.status_message.clear();
            } else {
                app.status_message = String::from("A previous question could not be answered");
            }
            Vec::new()
        }
        Action::UserLoaded(user) => {
            app.user = Some(user.clone());
            vec![Effect::MirrorUser(user)]
        }
        Action::Unauthorized => {
            warn!("Backend rejected credentials, signing out");
            app.user = None;
            app.status_message = String::from("Session expired");
            vec![Effect::SignOut]
        }
        Action::ToggleTheme => {
            app.theme = app.theme.toggled();
            app.status_message = format!("Theme: {}", app.theme.label());
            vec![Effect::PersistTheme(app.theme)]
        }
        Action::ToggleSidebar => {
            app.layout.sidebar_open = !app.layout.sidebar_open;
            Vec::new()
        }
        Action::CloseSidebar => {
            app.layout.sidebar_open = false;
            Vec::new()
        }
        Action::Resize(width) => {
            app.layout.resize(width);
            Vec::new()
        }
        Action::Quit => vec![Effect::Quit],
    }
}

fn reconcile(app: &mut App, mut sessions: Vec<Session>) -> Vec<Effect> {
    sort_by_recency(&mut sessions);
    app.sessions = sessions;
    app.sessions_loading = false;

    if let Some(current) = app.current_session_id.as_deref()
        && !app.sessions.iter().any(|s| s.id == current)
        && !app.creating_session
    {
        info!("Current session {} is gone, reselecting", current);
        app.current_session_id = None;
        app.session_request += 1;
        app.chat = ChatStatus::Idle;
        app.messages.clear();
    }

    if app.current_session_id.is_some() {
        return Vec::new();
    }

    match app.sessions.first() {
        Some(first) => {
            let id = first.id.clone();
            select(app, id)
        }
        None if app.creating_session => Vec::new(),
        None => {
            app.creating_session = true;
            vec![Effect::CreateSession]
        }
    }
}

fn select(app: &mut App, id: String) -> Vec<Effect> {
    app.session_request += 1;
    app.current_session_id = Some(id.clone());
    app.chat = ChatStatus::LoadingSession;
    app.messages.clear();
    vec![Effect::FetchSession {
        id,
        token: app.session_request,
    }]
}

/// Clear the outstanding ask if `token` answers it.
fn take_pending_ask(app: &mut App, token: u64) -> bool {
    match &app.pending_ask {
        Some(pending) if pending.token == token => {
            app.pending_ask = None;
            true
        }
        _ => {
            debug!("Discarding result of unknown ask (token {})", token);
            false
        }
    }
}

fn submit(app: &mut App, text: String) -> Vec<Effect> {
    let question = text.trim();
    if question.is_empty() || app.is_busy() {
        return Vec::new();
    }
    let Some(session_id) = app.current_session_id.clone() else {
        app.status_message = String::from("No chat selected");
        return Vec::new();
    };

    app.ask_request += 1;
    let token = app.ask_request;
    app.pending_ask = Some(PendingAsk {
        session_id: session_id.clone(),
        token,
    });
    app.messages.push(Message::user(question));
    app.chat = ChatStatus::Sending;
    app.status_message = String::from("Thinking...");
    vec![Effect::Ask {
        question: question.to_string(),
        session_id,
        token,
    }]
}

fn close_sidebar_on_mobile(app: &mut App) {
    if app.layout.is_mobile {
        app.layout.sidebar_open = false;
    }
}
