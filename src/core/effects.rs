//! Network effects.
//!
//! `perform` runs one effect against a [`ChatBackend`] and turns the outcome
//! into the action that feeds back into `update()`. This is where each
//! operation's failure policy lives:
//!
//! | effect          | on error                         |
//! |-----------------|----------------------------------|
//! | FetchSessions   | empty list                       |
//! | FetchSession    | `SessionLoaded { session: None }`|
//! | CreateSession   | `SessionCreated(None)`           |
//! | Ask             | `AskFailed` (fallback answer)    |
//! | DeleteSession   | `SessionDeleted { ok: false }`   |
//! | FetchUser       | nothing                          |
//!
//! A 401 from any call becomes `Action::Unauthorized` instead.
//!
//! Local effects (quit, persistence, sign-out) return `None`; the event loop
//! handles those itself.

use log::{error, warn};

use crate::api::{ApiError, ChatBackend};
use crate::core::action::{Action, Effect};

pub async fn perform(effect: Effect, backend: &dyn ChatBackend) -> Option<Action> {
    match effect {
        Effect::FetchSessions => match backend.list_sessions().await {
            Ok(sessions) => Some(Action::SessionsLoaded(sessions)),
            Err(e) => degrade(e, "list sessions", Action::SessionsLoaded(Vec::new())),
        },
        Effect::FetchSession { id, token } => match backend.get_session(&id).await {
            Ok(session) => Some(Action::SessionLoaded {
                token,
                session: Some(session),
            }),
            Err(e) => degrade(e, "load session", Action::SessionLoaded { token, session: None }),
        },
        Effect::CreateSession => match backend.create_session().await {
            Ok(id) => Some(Action::SessionCreated(Some(id))),
            Err(e) => degrade(e, "create session", Action::SessionCreated(None)),
        },
        Effect::Ask {
            question,
            session_id,
            token,
        } => match backend.ask(&question, Some(session_id.as_str())).await {
            Ok(response) => Some(Action::AnswerReceived {
                token,
                asked_in: session_id,
                answer: response.answer,
                session_id: response.session_id,
            }),
            Err(e) => degrade(
                e,
                "ask",
                Action::AskFailed {
                    token,
                    asked_in: session_id,
                },
            ),
        },
        Effect::DeleteSession(id) => match backend.delete_session(&id).await {
            Ok(()) => Some(Action::SessionDeleted { id, ok: true }),
            Err(e) => degrade(e, "delete session", Action::SessionDeleted { id, ok: false }),
        },
        Effect::FetchUser => match backend.current_user().await {
            Ok(user) => Some(Action::UserLoaded(user)),
            Err(ApiError::Unauthorized) => Some(Action::Unauthorized),
            Err(e) => {
                warn!("Failed to fetch user: {}", e);
                None
            }
        },
        Effect::MirrorUser(_)
        | Effect::PersistTheme(_)
        | Effect::SignOut
        | Effect::Quit => None,
    }
}

fn degrade(err: ApiError, what: &str, fallback: Action) -> Option<Action> {
    if err.is_unauthorized() {
        return Some(Action::Unauthorized);
    }
    error!("Failed to {}: {}", what, err);
    Some(fallback)
}


#[cfg(test)]
mod scenarios {
    use crate::api::{ApiError, Role};
    use crate::core::action::{Action, Effect};
    use crate::core::state::{ChatStatus, FALLBACK_ANSWER, GREETING};
    use crate::test_support::{FakeBackend, dispatch, session, test_app};

    #[tokio::test]
    async fn first_run_creates_exactly_one_session() {
        let backend = FakeBackend::new();
        let mut app = test_app();

        let local = dispatch(&mut app, &backend, Action::Start).await;
        assert_eq!(backend.creates(), 1);
        assert!(matches!(&local[..], [Effect::MirrorUser(_)]));
        assert_eq!(app.current_session_id.as_deref(), Some("new-1"));
        assert_eq!(app.sessions.len(), 1);
        assert_eq!(app.messages[0].content, GREETING);
        assert!(app.user.is_some());

        // Refreshing again does not create a duplicate
        dispatch(&mut app, &backend, Action::RefreshSessions).await;
        assert_eq!(backend.creates(), 1);
        assert_eq!(backend.session_ids(), vec!["new-1"]);
    }

    #[tokio::test]
    async fn existing_sessions_are_not_recreated() {
        let backend = FakeBackend::with_sessions(vec![
            session("a", Some("Prayer"), "2024-01-01T00:00:00"),
            session("b", Some("Fasting"), "2024-03-01T00:00:00"),
        ]);
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;
        assert_eq!(backend.creates(), 0);
        assert_eq!(app.current_session_id.as_deref(), Some("b"));
        assert_eq!(app.chat, ChatStatus::Idle);
    }

    #[tokio::test]
    async fn question_then_answer_in_order() {
        let backend = FakeBackend::new();
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;

        let question = "What are the five pillars of Islam?";
        dispatch(&mut app, &backend, Action::Submit(question.to_string())).await;

        assert_eq!(backend.asks(), 1);
        let n = app.messages.len();
        assert_eq!(app.messages[n - 2].role, Role::User);
        assert_eq!(app.messages[n - 2].content, question);
        assert_eq!(app.messages[n - 1].role, Role::Bot);
        assert!(!app.messages[n - 1].content.is_empty());
        assert_eq!(app.chat, ChatStatus::Idle);

        // The refreshed list reflects the new conversation
        let current = app.current_session().unwrap();
        assert_eq!(current.message_count, Some(2));
        assert_eq!(current.display_name(), question);
    }

    #[tokio::test]
    async fn history_survives_reselect() {
        let backend = FakeBackend::new();
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;
        dispatch(&mut app, &backend, Action::Submit("What is zakat?".to_string())).await;

        dispatch(&mut app, &backend, Action::NewChat).await;
        assert_eq!(app.current_session_id.as_deref(), Some("new-2"));
        assert_eq!(app.messages.len(), 1);

        dispatch(&mut app, &backend, Action::SelectSession("new-1".to_string())).await;
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].content, "What is zakat?");
    }

    #[tokio::test]
    async fn failed_ask_shows_fallback_answer() {
        let backend = FakeBackend::new();
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;

        backend.fail_with(ApiError::Timeout);
        dispatch(&mut app, &backend, Action::Submit("When is Eid?".to_string())).await;
        let last = app.messages.last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.content, FALLBACK_ANSWER);
        assert_eq!(app.chat, ChatStatus::Idle);
        assert!(app.status_message.is_empty());

        // The shell accepts the next question
        backend.recover();
        dispatch(&mut app, &backend, Action::Submit("And Eid al-Adha?".to_string())).await;
        assert_eq!(backend.asks(), 1);
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn deleting_current_leaves_a_valid_current() {
        let backend = FakeBackend::with_sessions(vec![
            session("a", Some("Prayer"), "2024-01-01T00:00:00"),
            session("b", Some("Fasting"), "2024-03-01T00:00:00"),
        ]);
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;
        assert_eq!(app.current_session_id.as_deref(), Some("b"));

        dispatch(&mut app, &backend, Action::DeleteSession("b".to_string())).await;
        assert_eq!(app.current_session_id.as_deref(), Some("a"));
        assert_eq!(app.sessions.len(), 1);

        dispatch(&mut app, &backend, Action::DeleteSession("a".to_string())).await;
        assert_eq!(backend.creates(), 1);
        let current = app.current_session_id.clone().unwrap();
        assert_eq!(backend.session_ids(), vec![current]);
    }

    #[tokio::test]
    async fn unreachable_backend_leaves_shell_usable() {
        let backend = FakeBackend::new();
        backend.fail_with(ApiError::Network("connection refused".to_string()));
        let mut app = test_app();
        dispatch(&mut app, &backend, Action::Start).await;
        assert!(app.sessions.is_empty());
        assert!(!app.sessions_loading);
        assert!(!app.creating_session);
        assert!(app.current_session_id.is_none());
        assert_eq!(app.messages[0].content, GREETING);

        backend.recover();
        dispatch(&mut app, &backend, Action::RefreshSessions).await;
        assert_eq!(backend.creates(), 1);
        assert!(app.current_session_id.is_some());
    }

    #[tokio::test]
    async fn expired_token_signs_out() {
        let backend = FakeBackend::new();
        backend.fail_with(ApiError::Unauthorized);
        let mut app = test_app();
        let local = dispatch(&mut app, &backend, Action::Start).await;
        assert!(local.contains(&Effect::SignOut));
        assert_eq!(backend.creates(), 0);
    }
}
