//! # TUI Components
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: assistant name, status message, signed-in user
//! - `MessageBubble`: one message of the thread
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state and emit events:
//! - `InputBox`: question field, disabled while the shell is busy
//! - `MessageList`: scrollable thread with a busy indicator
//! - `Sidebar`: session search, selection and two-step delete
//!
//! Stateful components split into a persistent state struct (owned by
//! `TuiState`) and a transient wrapper built every frame from that state
//! plus props.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (top bar)
//! ├── message.rs       (single message bubble)
//! ├── message_list.rs  (scrollable thread)
//! ├── sidebar.rs       (session browser)
//! └── input_box/       (question field)
//! ```

pub mod input_box;
pub mod message;
pub mod message_list;
pub mod sidebar;
mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
