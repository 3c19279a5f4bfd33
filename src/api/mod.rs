//! # Backend API
//!
//! Everything that talks HTTP to the assistant backend.
//!
//! - [`client`]: request building, bearer auth, status mapping, timeouts
//! - [`backend`]: the `ChatBackend` trait (ask + session CRUD + current user)
//! - [`profile`]: `/profile/*` endpoints
//! - [`auth`]: OAuth callback parsing and the on-disk credential store
//! - [`types`]: wire types

pub mod auth;
pub mod backend;
pub mod client;
pub mod profile;
pub mod types;

pub use backend::ChatBackend;
pub use client::{ApiClient, ApiError, ClientOptions};
pub use types::{AskResponse, Message, Role, Session, User};
