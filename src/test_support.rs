//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::api::types::now_iso;
use crate::api::{ApiError, AskResponse, ChatBackend, Message, Session, User};
use crate::core::action::{Action, Effect, update};
use crate::core::effects::perform;
use crate::core::state::{App, DEFAULT_MOBILE_BREAKPOINT, Layout, Theme};

/// Creates a wide-screen App with the default theme.
pub fn test_app() -> App {
    App::new(Theme::Light, Layout::new(120, DEFAULT_MOBILE_BREAKPOINT))
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("salam-test-{}-{}-{}", std::process::id(), name, n));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A session summary.
pub fn session(id: &str, name: Option<&str>, updated_at: &str) -> Session {
    Session {
        id: id.to_string(),
        name: name.map(str::to_string),
        preview: None,
        message_count: Some(0),
        created_at: Some(updated_at.to_string()),
        updated_at: updated_at.to_string(),
        messages: None,
    }
}

pub fn user() -> User {
    User {
        id: Some("g-42".to_string()),
        name: "Fatima Zahra".to_string(),
        email: "fatima@example.com".to_string(),
        picture: None,
    }
}

#[derive(Default)]
struct FakeState {
    sessions: Vec<Session>,
    next_id: usize,
    failure: Option<ApiError>,
    creates: usize,
    asks: usize,
}

/// In-memory `ChatBackend`. Sessions keep their messages so `get_session`
/// returns what `ask` appended.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().sessions = sessions;
        backend
    }

    /// Every call fails with `err` until [`FakeBackend::recover`].
    pub fn fail_with(&self, err: ApiError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn asks(&self) -> usize {
        self.state.lock().unwrap().asks
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.state.lock().unwrap().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::Api {
        status: 404,
        message: "Session not found".to_string(),
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<AskResponse, ApiError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.asks += 1;
        let id = session_id.ok_or_else(not_found)?;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(not_found)?;

        let answer = format!("Answer to: {question}");
        let messages = session.messages.get_or_insert_with(Vec::new);
        messages.push(Message::user(question));
        messages.push(Message::bot(answer.clone()));
        session.message_count = Some(messages.len() as u32);
        session.preview = Some(question.to_string());
        if session.name.is_none() {
            session.name = Some(question.to_string());
        }
        session.updated_at = now_iso();

        Ok(AskResponse {
            answer,
            session_id: Some(id.to_string()),
        })
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .iter()
            .map(|s| Session {
                messages: None,
                ..s.clone()
            })
            .collect())
    }

    async fn get_session(&self, id: &str) -> Result<Session, ApiError> {
        self.check()?;
        let state = self.state.lock().unwrap();
        state
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_session(&self) -> Result<String, ApiError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.creates += 1;
        state.next_id += 1;
        let id = format!("new-{}", state.next_id);
        let mut created = session(&id, None, &now_iso());
        created.messages = Some(Vec::new());
        state.sessions.push(created);
        Ok(id)
    }

    async fn delete_session(&self, id: &str) -> Result<(), ApiError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != id);
        if state.sessions.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.check()?;
        Ok(user())
    }
}

/// Feed `action` through `update()` and perform every resulting network
/// effect until nothing is left. Returns the local effects that were emitted.
pub async fn dispatch(app: &mut App, backend: &dyn ChatBackend, action: Action) -> Vec<Effect> {
    let mut queue = VecDeque::from([action]);
    let mut local = Vec::new();
    while let Some(action) = queue.pop_front() {
        for effect in update(app, action) {
            if effect.is_local() {
                local.push(effect);
            } else if let Some(next) = perform(effect, backend).await {
                queue.push_back(next);
            }
        }
    }
    local
}
