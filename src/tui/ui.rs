//! Frame layout.
//!
//! ```text
//! ┌ title bar ───────────────────────────────────────┐
//! │ sidebar        │ message list                    │
//! │ (docked, or    │                                 │
//! │  overlay when  ├─────────────────────────────────┤
//! │  narrow)       │ input box                       │
//! └ footer ──────────────────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, Sidebar, TitleBar};
use crate::tui::theme::Palette;
use crate::tui::{Focus, TuiState};

pub const FOOTER_NOTE: &str = "Answers based on Quran, Hadith, and authentic Islamic sources";
const KEY_HINTS: &str = "Tab chats  ^N new  ^T theme  ^C quit ";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let palette = Palette::for_theme(app.theme);
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    let [title_area, body_area, footer_area] = Layout::vertical([Length(1), Min(0), Length(1)]).areas(area);

    let user_name = app.user.as_ref().map(|u| u.first_name().to_string());
    TitleBar::new(user_name, app.status_message.clone(), palette).render(frame, title_area);
    draw_footer(frame, footer_area, &palette);

    let docked = app.layout.sidebar_open && !app.layout.is_mobile;
    let chat_area = if docked {
        let [sidebar_area, chat_area] =
            Layout::horizontal([Length(tui.sidebar_width), Min(0)]).areas(body_area);
        draw_sidebar(frame, sidebar_area, app, tui);
        chat_area
    } else {
        body_area
    };

    let input_height = tui.input_box.calculate_height(chat_area.width);
    let [messages_area, input_area] = Layout::vertical([Min(0), Length(input_height)]).areas(chat_area);
    MessageList::new(
        &mut tui.message_list,
        &app.messages,
        app.chat,
        palette,
        tui.spinner_frame,
    )
    .render(frame, messages_area);
    tui.input_box.render(frame, input_area);

    // Small viewport: the sidebar floats over the chat
    if app.layout.sidebar_open && app.layout.is_mobile {
        let width = tui.sidebar_width.min(body_area.width);
        let overlay = Rect::new(body_area.x, body_area.y, width, body_area.height);
        frame.render_widget(Clear, overlay);
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), overlay);
        draw_sidebar(frame, overlay, app, tui);
    }
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let focused = tui.focus == Focus::Sidebar;
    Sidebar::new(
        &mut tui.sidebar,
        app.current_session_id.as_deref(),
        app.sessions_loading,
        focused,
        Palette::for_theme(app.theme),
    )
    .render(frame, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, palette: &Palette) {
    let hints_width = KEY_HINTS.width() as u16;
    let [note_area, hints_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hints_width)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::styled(
            format!(" {FOOTER_NOTE}"),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )),
        note_area,
    );
    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(palette.muted)),
        hints_area,
    );
}
