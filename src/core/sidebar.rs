//! Sidebar logic that does not depend on the terminal: search filtering,
//! recency ordering, relative timestamps, and the two-step delete.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};

use crate::api::Session;

/// How long a first delete press stays armed.
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Sessions whose name contains `term`, ignoring case. A blank term keeps
/// everything; unnamed sessions never match a non-blank term.
pub fn filter_sessions<'a>(sessions: &'a [Session], term: &str) -> Vec<&'a Session> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return sessions.iter().collect();
    }
    sessions
        .iter()
        .filter(|s| {
            s.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&term))
        })
        .collect()
}

/// Most recently updated first. Stable, so equal or unparseable timestamps
/// keep the backend's order; unparseable ones sort last.
pub fn sort_by_recency(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| match (a.updated_at_utc(), b.updated_at_utc()) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// "Just now", "5m ago", "3h ago", "2d ago", then a plain date.
pub fn relative_time(updated: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(updated);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        updated.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

/// Sidebar label for a session's `updated_at`.
pub fn session_age(session: &Session, now: DateTime<Utc>) -> String {
    match session.updated_at_utc() {
        Some(updated) => relative_time(updated, now),
        None => session.updated_at.clone(),
    }
}

/// Two-step delete: the first press arms a window for one session, a second
/// press on the same session inside the window confirms.
#[derive(Debug, Default)]
pub struct DeleteConfirm {
    armed: Option<(String, Instant)>,
}

impl DeleteConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a delete press. Returns `true` when the delete should happen.
    pub fn press(&mut self, id: &str, now: Instant) -> bool {
        if self.is_armed(id, now) {
            self.armed = None;
            return true;
        }
        self.armed = Some((id.to_string(), now));
        false
    }

    pub fn is_armed(&self, id: &str, now: Instant) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|(armed_id, at)| armed_id == id && now.duration_since(*at) < DELETE_CONFIRM_WINDOW)
    }

    /// The id currently awaiting confirmation, if its window is still open.
    pub fn pending(&self, now: Instant) -> Option<&str> {
        self.armed
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) < DELETE_CONFIRM_WINDOW)
            .map(|(id, _)| id.as_str())
    }

    /// Drop an expired window. Returns `true` if something was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.armed.is_some() && self.pending(now).is_none() {
            self.armed = None;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.armed = None;
    }
}
