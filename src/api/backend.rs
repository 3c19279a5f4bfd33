//! Session store accessor.
//!
//! `ChatBackend` is the seam between the application core and the network:
//! the event loop holds an `Arc<dyn ChatBackend>`, tests plug in an
//! in-memory implementation. Every operation returns `Result<T, ApiError>`;
//! the per-operation degrade policies (empty list, missing session, fallback
//! answer) are applied by `core::effects`, not here.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{ApiClient, ApiError};
use super::types::{AskRequest, AskResponse, NewSession, Session, SessionList, User};

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Ask a question within a session (`None` lets the backend pick one).
    async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<AskResponse, ApiError>;

    /// Session summaries. Order is whatever the backend returns.
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError>;

    /// Full session including its messages.
    async fn get_session(&self, id: &str) -> Result<Session, ApiError>;

    /// Allocate a new empty session and return its id.
    async fn create_session(&self) -> Result<String, ApiError>;

    async fn delete_session(&self, id: &str) -> Result<(), ApiError>;

    async fn current_user(&self) -> Result<User, ApiError>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<AskResponse, ApiError> {
        let body = AskRequest {
            question,
            session_id,
        };
        self.send(Method::POST, "/ask", Some(&body)).await
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let list: SessionList = self.get("/sessions").await?;
        Ok(list.sessions)
    }

    async fn get_session(&self, id: &str) -> Result<Session, ApiError> {
        self.get(&format!("/sessions/{id}")).await
    }

    async fn create_session(&self) -> Result<String, ApiError> {
        let created: NewSession = self.send::<_, ()>(Method::POST, "/sessions/new", None).await?;
        Ok(created.session_id)
    }

    async fn delete_session(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty::<()>(Method::DELETE, &format!("/sessions/{id}"), None)
            .await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        if !self.has_token() {
            return Err(ApiError::Unauthorized);
        }
        self.get("/auth/me").await
    }
}
