//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Effects
//!
//! `update()` returns effects. Local ones (quit, sign-out, persisting the
//! theme or the user record) run here on the loop thread. Network ones are
//! spawned on the tokio runtime; each task sends its resulting action back
//! over an mpsc channel that the loop drains every iteration.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (answer pending, session or list loading): draws every ~80ms
//!   so the spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events, background
//!   results, or an expiring delete confirmation.
//!
//! Terminal resizes are debounced before the new width reaches the core, so
//! dragging a window edge does not flap the sidebar open and closed.

mod component;
mod components;
mod event;
mod markdown;
mod theme;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::api::auth::CredentialStore;
use crate::api::{ChatBackend, User};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::effects::perform;
use crate::core::prefs::{UiPrefs, load_prefs, prefs_path, save_prefs};
use crate::core::state::{App, Layout, Theme};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, SidebarEvent, SidebarState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::Palette;

const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
const BUSY_FRAME: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Why the chat screen closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// The backend rejected the stored token; credentials were cleared.
    SignedOut,
}

/// Which pane receives editing and navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub sidebar: SidebarState,
    pub focus: Focus,
    pub spinner_frame: usize,
    pub sidebar_width: u16,
}

impl TuiState {
    pub fn new(theme: Theme, sidebar_width: u16) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(Palette::for_theme(theme)),
            sidebar: SidebarState::new(),
            focus: Focus::Input, // User expects to type immediately
            spinner_frame: 0,
            sidebar_width,
        }
    }

    /// Copy shell state into component props before a frame.
    fn sync(&mut self, app: &App) {
        self.sidebar.sync(&app.sessions);
        self.input_box.palette = Palette::for_theme(app.theme);
        self.input_box.disabled = app.is_busy() || app.current_session_id.is_none();
        if !app.layout.sidebar_open {
            self.focus = Focus::Input;
        }
        self.input_box.focused = self.focus == Focus::Input;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: draw() resets the blink timer
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs effects: local ones in place, network ones on the runtime.
struct EffectRunner {
    backend: Arc<dyn ChatBackend>,
    store: CredentialStore,
    prefs_path: Option<PathBuf>,
    tx: mpsc::Sender<Action>,
}

impl EffectRunner {
    /// Apply an action and run what it asks for. Returns `Some` when the
    /// screen should close.
    fn dispatch(&self, app: &mut App, action: Action) -> Option<Exit> {
        debug!("Dispatching {:?}", action);
        let mut exit = None;
        for effect in update(app, action) {
            match effect {
                Effect::Quit => {
                    exit.get_or_insert(Exit::Quit);
                }
                Effect::SignOut => {
                    if let Err(e) = self.store.clear() {
                        warn!("Failed to clear credentials: {}", e);
                    }
                    exit = Some(Exit::SignedOut);
                }
                Effect::MirrorUser(user) => {
                    if let Err(e) = self.store.mirror_user(&user) {
                        warn!("Failed to store user record: {}", e);
                    }
                }
                Effect::PersistTheme(theme) => {
                    if let Some(path) = &self.prefs_path
                        && let Err(e) = save_prefs(path, &UiPrefs { theme })
                    {
                        warn!("Failed to save theme: {}", e);
                    }
                }
                effect => self.spawn(effect),
            }
        }
        exit
    }

    fn spawn(&self, effect: Effect) {
        debug!("Spawning {:?}", effect);
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(action) = perform(effect, backend.as_ref()).await
                && tx.send(action).is_err()
            {
                warn!("Failed to deliver backend result: receiver dropped");
            }
        });
    }
}

pub fn run(
    config: &ResolvedConfig,
    backend: Arc<dyn ChatBackend>,
    store: CredentialStore,
    user: Option<User>,
) -> io::Result<Exit> {
    let prefs_path = prefs_path()
        .map_err(|e| warn!("No location for UI preferences: {}", e))
        .ok();
    // A theme chosen in the UI outlives the configured default
    let theme = prefs_path
        .as_deref()
        .and_then(load_prefs)
        .map(|prefs| prefs.theme)
        .unwrap_or(config.theme);
    let (width, _) = crossterm::terminal::size().unwrap_or((80, 24));

    let mut app = App::new(theme, Layout::new(width, config.mobile_breakpoint));
    app.user = user;
    let mut tui = TuiState::new(theme, config.sidebar_width);

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runner = EffectRunner {
        backend,
        store,
        prefs_path,
        tx,
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut pending_resize: Option<(u16, Instant)> = None;
    let mut shown_session = app.current_session_id.clone();

    let mut closing = runner.dispatch(&mut app, Action::Start);

    let exit = loop {
        if let Some(exit) = closing {
            break exit;
        }

        // A different thread starts at the bottom with fresh scroll state
        if shown_session != app.current_session_id {
            tui.message_list = MessageListState::new();
            shown_session = app.current_session_id.clone();
        }
        tui.sync(&app);

        if tui.sidebar.confirm.expire(Instant::now()) {
            needs_redraw = true;
        }
        if let Some((width, at)) = pending_resize
            && at.elapsed() >= RESIZE_DEBOUNCE
        {
            pending_resize = None;
            needs_redraw = true;
            closing = runner.dispatch(&mut app, Action::Resize(width));
            tui.sync(&app);
        }

        let animating = app.is_busy() || app.sessions_loading || app.creating_session;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if animating || pending_resize.is_some() {
            BUSY_FRAME
        } else {
            IDLE_POLL
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(done) = handle_event(&mut app, &mut tui, &runner, event, &mut pending_resize) {
                closing = Some(done);
                break;
            }
            tui.sync(&app);
        }

        // Results from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if let Some(done) = runner.dispatch(&mut app, action) {
                closing.get_or_insert(done);
            }
        }
    };

    ratatui::restore();
    info!("Chat screen closed: {:?}", exit);
    Ok(exit)
}

fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    runner: &EffectRunner,
    event: TuiEvent,
    pending_resize: &mut Option<(u16, Instant)>,
) -> Option<Exit> {
    // Global keys work regardless of focus
    match event {
        TuiEvent::ForceQuit => return runner.dispatch(app, Action::Quit),
        TuiEvent::Resize(width, _) => {
            *pending_resize = Some((width, Instant::now()));
            return None;
        }
        TuiEvent::ToggleSidebar => return runner.dispatch(app, Action::ToggleSidebar),
        TuiEvent::NewChat => {
            tui.focus = Focus::Input;
            return runner.dispatch(app, Action::NewChat);
        }
        TuiEvent::ToggleTheme => return runner.dispatch(app, Action::ToggleTheme),
        TuiEvent::Refresh => return runner.dispatch(app, Action::RefreshSessions),
        TuiEvent::FocusNext => {
            return match tui.focus {
                Focus::Input => {
                    let exit = if app.layout.sidebar_open {
                        None
                    } else {
                        runner.dispatch(app, Action::ToggleSidebar)
                    };
                    tui.focus = Focus::Sidebar;
                    tui.sidebar.select_current(app.current_session_id.as_deref());
                    exit
                }
                Focus::Sidebar => leave_sidebar(app, tui, runner),
            };
        }
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            return None;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Sidebar => match tui.sidebar.handle_event(&event)? {
            SidebarEvent::Select(id) => {
                tui.focus = Focus::Input;
                runner.dispatch(app, Action::SelectSession(id))
            }
            SidebarEvent::Delete(id) => {
                info!("Deleting session {}", id);
                runner.dispatch(app, Action::DeleteSession(id))
            }
            SidebarEvent::Dismiss => leave_sidebar(app, tui, runner),
        },
        Focus::Input => match event {
            // Arrow keys scroll the thread; the input is mostly one line
            TuiEvent::CursorUp => {
                tui.message_list.handle_event(&TuiEvent::ScrollUp);
                None
            }
            TuiEvent::CursorDown => {
                tui.message_list.handle_event(&TuiEvent::ScrollDown);
                None
            }
            TuiEvent::Escape if app.layout.is_mobile && app.layout.sidebar_open => {
                runner.dispatch(app, Action::CloseSidebar)
            }
            _ => match tui.input_box.handle_event(&event)? {
                InputEvent::Submit(text) => {
                    tui.message_list.scroll_to_bottom();
                    runner.dispatch(app, Action::Submit(text))
                }
                InputEvent::ContentChanged => None,
            },
        },
    }
}

/// Hand focus back to the input; the overlay closes on small viewports.
fn leave_sidebar(app: &mut App, tui: &mut TuiState, runner: &EffectRunner) -> Option<Exit> {
    tui.focus = Focus::Input;
    if app.layout.is_mobile {
        runner.dispatch(app, Action::CloseSidebar)
    } else {
        None
    }
}
