//! # TitleBar Component
//!
//! One-line header: assistant name on the left, then the status message and
//! the signed-in user on the right. Purely presentational; everything is a
//! prop.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub const APP_TITLE: &str = "Islamic AI Assistant";

pub struct TitleBar {
    pub user_name: Option<String>,
    pub status_message: String,
    pub palette: Palette,
}

impl TitleBar {
    pub fn new(user_name: Option<String>, status_message: String, palette: Palette) -> Self {
        Self {
            user_name,
            status_message,
            palette,
        }
    }

    fn right_text(&self) -> String {
        match (&self.user_name, self.status_message.is_empty()) {
            (Some(name), false) => format!("{} | {} ", self.status_message, name),
            (Some(name), true) => format!("{name} "),
            (None, false) => format!("{} ", self.status_message),
            (None, true) => String::new(),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let p = self.palette;
        let right = self.right_text();
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(right.width() as u16)])
                .areas(area);

        let title = Line::from(vec![
            Span::styled(" ☪ ", Style::default().fg(p.accent)),
            Span::styled(APP_TITLE, Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
        ]);
        frame.render_widget(Paragraph::new(title), left_area);
        frame.render_widget(
            Paragraph::new(right).style(Style::default().fg(p.muted)),
            right_area,
        );
    }
}
