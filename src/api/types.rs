//! Wire types for the assistant backend.
//!
//! Everything here mirrors the JSON the backend sends and receives. The
//! client holds at most a partial projection of a session: list responses
//! carry the summary fields only, `GET /sessions/{id}` adds `messages`.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot", alias = "assistant")]
    Bot,
}

/// One turn of a conversation. Display order is insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Some(now_iso()),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
            timestamp: Some(now_iso()),
        }
    }
}

/// A server-tracked conversation thread.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub message_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: String,
    /// Only present on the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl Session {
    /// Parsed `updated_at`. The backend emits naive ISO timestamps in its
    /// local time; RFC 3339 strings are accepted as well.
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("New Chat")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(default, alias = "google_id")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AskRequest<'a> {
    pub question: &'a str,
    pub session_id: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Deserialize, Debug)]
pub struct NewSession {
    pub session_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub preferences: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

/// Partial profile update; absent fields are left untouched by the server.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserStats {
    pub total_chats: u32,
    pub total_messages: u32,
    pub favorite_topics: Vec<String>,
    pub joined_date: String,
    pub last_active: String,
}

impl UserStats {
    /// Placeholder shown when the stats endpoint is unavailable.
    pub fn fallback() -> Self {
        let now = now_iso();
        Self {
            total_chats: 0,
            total_messages: 0,
            favorite_topics: ["Prayer", "Fasting", "Zakat"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            joined_date: now.clone(),
            last_active: now,
        }
    }
}

/// Current time as an RFC 3339 UTC string.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an ISO-8601 timestamp. Without an offset it is local time; an
/// ambiguous local time (DST fold) takes the earlier instant.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
