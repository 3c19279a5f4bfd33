//! HTTP client wrapper for the assistant backend.
//!
//! Builds requests against one configurable origin, attaches the bearer token
//! when one is held, and folds every outcome into `Result<T, ApiError>`.
//!
//! The client has no global side effects. An authorization failure is
//! reported as [`ApiError::Unauthorized`] and nothing else; clearing stored
//! credentials is the caller's job (see `core::effects` and `cli`).

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_GET_RETRIES: u32 = 1;

/// Errors surfaced by backend calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// HTTP 401. The stored token is missing, expired, or revoked.
    Unauthorized,
    /// Connection-level failure (DNS, refused, reset).
    Network(String),
    /// No response within the configured timeout.
    Timeout,
    /// Backend answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body did not match the expected shape.
    Parse(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Whether an idempotent request may be sent again.
    fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "not authorized (please log in again)"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Api { status, message } => write!(f, "backend error (HTTP {status}): {message}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Tunables for [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Extra attempts for GET requests after a transient failure.
    pub get_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            get_retries: DEFAULT_GET_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    options: ClientOptions,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, options: ClientOptions) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            options,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Returns a copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            token: Some(token),
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode a JSON response.
    pub async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, path, body).await?;
        response.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Send a request and discard the response body.
    pub async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let retries = if method == Method::GET {
            self.options.get_retries
        } else {
            0
        };

        let mut attempt = 0u32;
        loop {
            let mut builder = self.request(method.clone(), path);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            debug!("{} {} (attempt {})", method, path, attempt + 1);
            let result = match builder.send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(ApiError::from(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < retries => {
                    warn!("{} {} failed ({}), retrying", method, path, e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!("{} {} failed: {}", method, path, e);
                    return Err(e);
                }
                ok => return ok,
            }
        }
    }
}

/// Map non-success statuses to `ApiError`, keeping the backend's message.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        message: error_detail(&body),
    })
}

/// FastAPI reports errors as `{"detail": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}
