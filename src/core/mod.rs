//! # Core Application Logic
//!
//! The chat shell's behavior: which session is current, what the thread
//! shows, when to create, reselect, or refresh. It knows nothing about the
//! terminal.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  state + update()       │
//!                    │  no I/O                 │
//!                    └───────────┬─────────────┘
//!                       Effects  │  Actions
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  effects   │      │    CLI     │
//!     │  Adapter   │      │ (backend)  │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all shell state in one place
//! - [`action`]: `Action`, `Effect`, and the `update()` reducer
//! - [`effects`]: runs network effects against a `ChatBackend`
//! - [`sidebar`]: search, recency order, relative times, delete confirmation
//! - [`prefs`]: persisted UI preferences
//! - [`config`]: `~/.salam/config.toml` and override resolution

pub mod action;
pub mod config;
pub mod effects;
pub mod prefs;
pub mod sidebar;
pub mod state;

pub use action::{Action, Effect, update};
pub use state::App;
