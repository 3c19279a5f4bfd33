//! # Authentication
//!
//! Sign-in is an OAuth redirect handled entirely by the backend:
//!
//! ```text
//! browser → {base}/auth/google → provider → {base}/auth/google/callback
//!         → client callback route ?token=...   (or ?error=...)
//! ```
//!
//! A terminal cannot receive that redirect, so the user opens
//! [`login_url`] in a browser and pastes the final URL back;
//! [`parse_callback`] extracts the token from it.
//!
//! The token and a mirror of the user profile live in
//! `~/.salam/credentials.json`. The mirror is a convenience copy of server
//! state, refreshed from `GET /auth/me`, never a source of truth.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::types::User;

/// Token plus mirrored user, as persisted on disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Reasons a callback URL did not yield a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    AuthFailed,
    AccessDenied,
    TokenExchangeFailed,
    Other(String),
    NoToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AuthFailed => write!(f, "Authentication failed. Please try again."),
            AuthError::AccessDenied => {
                write!(f, "You denied access to your account. Please try again.")
            }
            AuthError::TokenExchangeFailed => {
                write!(f, "Failed to authenticate with Google. Please try again.")
            }
            AuthError::Other(code) => write!(f, "Authentication error: {code}"),
            AuthError::NoToken => write!(f, "No token was received. Please try again."),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    fn from_code(code: &str) -> Self {
        match code {
            "auth_failed" => AuthError::AuthFailed,
            "access_denied" => AuthError::AccessDenied,
            "token_exchange_failed" => AuthError::TokenExchangeFailed,
            "no_token" => AuthError::NoToken,
            other => AuthError::Other(other.to_string()),
        }
    }
}

/// Where the browser should be sent to start sign-in.
pub fn login_url(base_url: &str) -> String {
    format!("{}/auth/google", base_url.trim_end_matches('/'))
}

/// Extract the token from the callback the backend redirected to.
///
/// Accepts a full URL (`http://localhost:3000/auth/callback?token=...`),
/// a bare query (`?token=...` or `token=...`).
pub fn parse_callback(input: &str) -> Result<String, AuthError> {
    let input = input.trim();
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(_) => {
            let query = input.trim_start_matches('?');
            Url::parse(&format!("http://callback.invalid/?{query}"))
                .map_err(|_| AuthError::NoToken)?
        }
    };

    let mut token = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "token" if !value.is_empty() => token = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, error) {
        (Some(token), _) => Ok(token),
        (None, Some(code)) => Err(AuthError::from_code(&code)),
        (None, None) => Err(AuthError::NoToken),
    }
}

/// On-disk home of [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.salam/credentials.json`
    pub fn default_location() -> io::Result<Self> {
        Ok(Self::new(salam_dir()?.join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> io::Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let creds = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(creds))
    }

    pub fn save(&self, creds: &Credentials) -> io::Result<()> {
        atomic_write_json(&self.path, creds)?;
        debug!("Credentials saved to {}", self.path.display());
        Ok(())
    }

    /// Update the mirrored user, keeping the token. No-op when signed out.
    pub fn mirror_user(&self, user: &User) -> io::Result<()> {
        match self.load()? {
            Some(mut creds) => {
                creds.user = Some(user.clone());
                self.save(&creds)
            }
            None => Ok(()),
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Returns `~/.salam/`, creating it if needed.
pub fn salam_dir() -> io::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
    let dir = home.join(".salam");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
