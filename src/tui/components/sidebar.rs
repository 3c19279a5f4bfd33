//! # Sidebar Component
//!
//! Session browser: search box, sessions most recent first, two-step delete.
//! Focused with Tab; on narrow terminals it is drawn as an overlay and
//! closes after a choice is made.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState` and handles events
//! - `Sidebar` is created each frame with borrowed state and props

use std::time::Instant;

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::Session;
use crate::core::sidebar::{DeleteConfirm, filter_sessions, session_age};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Select(String),
    /// Second press inside the confirmation window.
    Delete(String),
    Dismiss,
}

/// Persistent state for the sidebar.
#[derive(Default)]
pub struct SidebarState {
    /// Snapshot of the shell's session list, refreshed by the event loop.
    pub sessions: Vec<Session>,
    pub search: String,
    pub selected: usize,
    pub list_state: ListState,
    pub confirm: DeleteConfirm,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot when the shell's list changed.
    pub fn sync(&mut self, sessions: &[Session]) {
        if self.sessions != sessions {
            self.sessions = sessions.to_vec();
            self.clamp_selection();
        }
    }

    /// Ids matching the current search, in display order.
    pub fn visible_ids(&self) -> Vec<String> {
        filter_sessions(&self.sessions, &self.search)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    /// Put the selection on `current` (used when the sidebar gains focus).
    pub fn select_current(&mut self, current: Option<&str>) {
        if let Some(current) = current
            && let Some(idx) = self.visible_ids().iter().position(|id| id == current)
        {
            self.selected = idx;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn selected_id(&self) -> Option<String> {
        self.visible_ids().into_iter().nth(self.selected)
    }

    fn edit_search(&mut self, edit: impl FnOnce(&mut String)) {
        edit(&mut self.search);
        self.selected = 0;
    }
}

impl EventHandler for SidebarState {
    type Event = SidebarEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let now = Instant::now();
        if !matches!(event, TuiEvent::Delete) {
            self.confirm.reset();
        }

        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected += 1;
                self.clamp_selection();
                None
            }
            TuiEvent::Submit => self.selected_id().map(SidebarEvent::Select),
            TuiEvent::Delete => {
                let id = self.selected_id()?;
                self.confirm.press(&id, now).then_some(SidebarEvent::Delete(id))
            }
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => {
                self.edit_search(|s| s.push(*c));
                None
            }
            TuiEvent::Paste(text) => {
                self.edit_search(|s| s.extend(text.chars().filter(|c| !c.is_control())));
                None
            }
            TuiEvent::Backspace => {
                self.edit_search(|s| {
                    s.pop();
                });
                None
            }
            TuiEvent::Escape if !self.search.is_empty() => {
                self.edit_search(String::clear);
                None
            }
            TuiEvent::Escape => Some(SidebarEvent::Dismiss),
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    current: Option<&'a str>,
    loading: bool,
    focused: bool,
    palette: Palette,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        state: &'a mut SidebarState,
        current: Option<&'a str>,
        loading: bool,
        focused: bool,
        palette: Palette,
    ) -> Self {
        Self {
            state,
            current,
            loading,
            focused,
            palette,
        }
    }
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let p = self.palette;
        let now = Instant::now();
        let pending = self.state.confirm.pending(now).map(str::to_string);

        let hint = if pending.is_some() {
            Line::styled(" Press Delete again to remove ", Style::default().fg(p.danger))
        } else if self.focused {
            Line::styled(" Enter open  Del delete  Esc back ", Style::default().fg(p.muted))
        } else {
            Line::styled(" Tab to browse ", Style::default().fg(p.muted))
        };
        let border = if self.focused { p.accent } else { p.border };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Line::styled(" Chats ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)))
            .title_bottom(hint.alignment(Alignment::Center))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [search_area, _, list_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        let search_line = if self.state.search.is_empty() {
            Line::styled("/ Search chats...", Style::default().fg(p.muted).add_modifier(Modifier::ITALIC))
        } else {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(p.muted)),
                Span::styled(self.state.search.clone(), Style::default().fg(p.fg)),
            ])
        };
        frame.render_widget(Paragraph::new(search_line), search_area);

        let visible = filter_sessions(&self.state.sessions, &self.state.search);
        let empty = if self.state.sessions.is_empty() {
            Some(if self.loading { "Loading chats..." } else { "No chats yet" })
        } else if visible.is_empty() {
            Some("No chats found")
        } else {
            None
        };
        if let Some(message) = empty {
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(p.muted))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, list_area);
            return;
        }

        let width = list_area.width as usize;
        let wall_clock = Utc::now();
        let items: Vec<ListItem> = visible
            .iter()
            .map(|session| {
                let is_current = self.current == Some(session.id.as_str());
                let armed = pending.as_deref() == Some(session.id.as_str());
                session_item(session, is_current, armed, width, wall_clock, &p)
            })
            .collect();

        let selected = if self.focused {
            Some(self.state.selected)
        } else {
            visible.iter().position(|s| self.current == Some(s.id.as_str()))
        };
        self.state.list_state.select(selected);

        let list = List::new(items).highlight_style(Style::default().bg(p.highlight));
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);
    }
}

fn session_item(
    session: &Session,
    is_current: bool,
    armed: bool,
    width: usize,
    now: DateTime<Utc>,
    p: &Palette,
) -> ListItem<'static> {
    let marker = if is_current { "▌" } else { " " };
    let age = session_age(session, now);
    let name_width = width.saturating_sub(2 + age.width() + 1);
    let name = truncate(session.display_name(), name_width);
    let gap = width.saturating_sub(1 + name.width() + age.width());

    let name_style = if is_current {
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.fg)
    };
    let title = Line::from(vec![
        Span::styled(marker, Style::default().fg(p.accent)),
        Span::styled(name, name_style),
        Span::raw(" ".repeat(gap)),
        Span::styled(age, Style::default().fg(p.muted)),
    ]);

    let detail = if armed {
        Line::styled(" Delete this chat?", Style::default().fg(p.danger).add_modifier(Modifier::BOLD))
    } else {
        let text = match (&session.preview, session.message_count) {
            (Some(preview), _) if !preview.is_empty() => preview.replace('\n', " "),
            (_, Some(1)) => "1 message".to_string(),
            (_, Some(n)) => format!("{n} messages"),
            _ => String::new(),
        };
        Line::styled(
            format!(" {}", truncate(&text, width.saturating_sub(1))),
            Style::default().fg(p.muted),
        )
    };

    ListItem::new(vec![title, detail])
}

/// Truncate to `max_width` display columns, ending in "…" when cut.
fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Theme;
    use crate::test_support::session;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn state_with(names: &[(&str, &str)]) -> SidebarState {
        let mut state = SidebarState::new();
        let sessions: Vec<Session> = names
            .iter()
            .map(|&(id, name)| session(id, Some(name), "2024-01-01T00:00:00"))
            .collect();
        state.sync(&sessions);
        state
    }

    fn draw(state: &mut SidebarState, current: Option<&str>, loading: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(34, 14)).unwrap();
        terminal
            .draw(|f| {
                Sidebar::new(state, current, loading, true, Palette::for_theme(Theme::Light))
                    .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn enter_selects_highlighted_session() {
        let mut state = state_with(&[("a", "Prayer"), ("b", "Fasting")]);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.handle_event(&TuiEvent::Submit), Some(SidebarEvent::Select("b".to_string())));
        // Clamped at the end
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn typing_filters_and_resets_selection() {
        let mut state = state_with(&[("a", "Prayer times"), ("b", "Fasting"), ("c", "Night prayer")]);
        state.handle_event(&TuiEvent::CursorDown);
        for c in "PRAY".chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
        assert_eq!(state.selected, 0);
        assert_eq!(state.visible_ids(), vec!["a", "c"]);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.handle_event(&TuiEvent::Submit), Some(SidebarEvent::Select("c".to_string())));
    }

    #[test]
    fn escape_clears_search_then_dismisses() {
        let mut state = state_with(&[("a", "Hajj")]);
        state.handle_event(&TuiEvent::InputChar('h'));
        assert_eq!(state.handle_event(&TuiEvent::Escape), None);
        assert!(state.search.is_empty());
        assert_eq!(state.handle_event(&TuiEvent::Escape), Some(SidebarEvent::Dismiss));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut state = state_with(&[("a", "Hajj"), ("b", "Umrah")]);
        assert_eq!(state.handle_event(&TuiEvent::Delete), None);
        assert_eq!(state.handle_event(&TuiEvent::Delete), Some(SidebarEvent::Delete("a".to_string())));
    }

    #[test]
    fn other_key_cancels_pending_delete() {
        let mut state = state_with(&[("a", "Hajj"), ("b", "Umrah")]);
        state.handle_event(&TuiEvent::Delete);
        state.handle_event(&TuiEvent::CursorDown);
        // First press on the new row only arms it
        assert_eq!(state.handle_event(&TuiEvent::Delete), None);
    }

    #[test]
    fn select_current_follows_active_session() {
        let mut state = state_with(&[("a", "Hajj"), ("b", "Umrah"), ("c", "Zakat")]);
        state.select_current(Some("c"));
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn sync_clamps_selection() {
        let mut state = state_with(&[("a", "Hajj"), ("b", "Umrah")]);
        state.selected = 1;
        state.sync(&[session("a", Some("Hajj"), "2024-01-01T00:00:00")]);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn empty_states() {
        let mut state = SidebarState::new();
        assert!(draw(&mut state, None, true).contains("Loading chats..."));
        assert!(draw(&mut state, None, false).contains("No chats yet"));

        let mut state = state_with(&[("a", "Hajj")]);
        state.search = "xyz".to_string();
        assert!(draw(&mut state, None, false).contains("No chats found"));
    }

    #[test]
    fn renders_names() {
        let mut state = state_with(&[("a", "Prayer"), ("b", "Fasting")]);
        let text = draw(&mut state, Some("a"), false);
        assert!(text.contains("Prayer"));
        assert!(text.contains("Fasting"));
        assert!(text.contains("Chats"));
    }

    #[test]
    fn truncate_by_display_width() {
        assert_eq!(truncate("Fasting", 10), "Fasting");
        assert_eq!(truncate("Ramadan questions", 8), "Ramadan…");
        assert_eq!(truncate("abc", 0), "");
    }
}
