use chrono::Local;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::types::parse_timestamp;
use crate::api::{Message, Role};
use crate::tui::markdown;
use crate::tui::theme::Palette;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// One chat bubble. Built per frame; the content is rendered up front so the
/// list can measure it before laying out the scroll view.
///
/// Bot answers go through the markdown renderer, user questions are shown
/// verbatim.
pub struct MessageBubble<'a> {
    role: Role,
    paragraph: Paragraph<'a>,
    time: Option<String>,
    palette: Palette,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message, palette: &Palette) -> Self {
        let content = message.content.trim();
        let text = match message.role {
            Role::Bot => markdown::render(content, palette),
            Role::User => Text::styled(content, Style::default().fg(palette.fg)),
        };
        let time = message
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .map(|t| t.with_timezone(&Local).format("%H:%M").to_string());

        Self {
            role: message.role,
            paragraph: Paragraph::new(text).wrap(Wrap { trim: false }),
            time,
            palette: *palette,
        }
    }

    /// Rows needed at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = self.paragraph.line_count(content_width) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }

    fn label(&self) -> &'static str {
        match self.role {
            Role::User => "You",
            Role::Bot => "Assistant",
        }
    }

    fn border_style(&self) -> Style {
        match self.role {
            Role::User => Style::default().fg(self.palette.user),
            Role::Bot => Style::default().fg(self.palette.accent),
        }
    }
}

impl Widget for MessageBubble<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let border_style = self.border_style();
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::styled(
                format!(" {} ", self.label()),
                border_style.add_modifier(Modifier::BOLD),
            ))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if let Some(time) = &self.time {
            block = block.title(
                Line::styled(format!(" {time} "), Style::default().fg(self.palette.muted))
                    .alignment(Alignment::Right),
            );
        }
        if self.role == Role::User {
            block = block.title_alignment(Alignment::Right);
        }

        let inner = block.inner(area);
        block.render(area, buf);
        self.paragraph.render(inner, buf);
    }
}
