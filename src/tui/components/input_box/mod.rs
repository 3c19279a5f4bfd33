//! # InputBox Component
//!
//! The question field under the thread.
//!
//! - Enter submits, Ctrl+J inserts a newline
//! - Left/Right/Home/End move the cursor, Backspace/Delete edit
//! - While `disabled` (an answer or a session load is pending) the box
//!   ignores edits and submission, and says why in its title
//!
//! Lines are hard-wrapped by display width, so the cursor position computed
//! here always matches what is drawn.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

pub const PLACEHOLDER: &str = "Ask your question about Islam (prayer, fasting, zakat, etc.)...";
/// Maximum visible lines before the box scrolls internally.
const MAX_VISIBLE_LINES: u16 = 5;
/// Borders (top + bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Borders (left + right).
const HORIZONTAL_OVERHEAD: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Byte offset into `buffer`
    cursor: usize,
    /// Prop: true while the shell is busy
    pub disabled: bool,
    /// Prop: false while the sidebar has focus
    pub focused: bool,
    /// Prop
    pub palette: Palette,
}

impl InputBox {
    pub fn new(palette: Palette) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            disabled: false,
            focused: true,
            palette,
        }
    }

    /// Height for the current buffer at `width`, borders included.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = saturate(hard_wrap(&self.buffer, inner).len());
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// (line, column) of the cursor in wrapped coordinates.
    fn cursor_position(&self, inner_width: u16) -> (u16, u16) {
        let before = hard_wrap(&self.buffer[..self.cursor], inner_width);
        let line = saturate(before.len().saturating_sub(1));
        let col = saturate(before.last().map(|l| display_width(l)).unwrap_or(0));
        if inner_width > 0 && col >= inner_width {
            (line.saturating_add(1), 0)
        } else {
            (line, col)
        }
    }

    fn shows_cursor(&self) -> bool {
        self.focused && !self.disabled
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let p = self.palette;
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD);

        let (title, border) = if self.disabled {
            (" Waiting for the assistant... ", Style::default().fg(p.muted))
        } else {
            (" Your question ", Style::default().fg(p.accent))
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(title);

        if self.buffer.is_empty() {
            let placeholder = Paragraph::new(PLACEHOLDER)
                .style(Style::default().fg(p.muted).add_modifier(Modifier::ITALIC))
                .block(block);
            frame.render_widget(placeholder, area);
            if self.shows_cursor() {
                frame.set_cursor_position((area.x + 1, area.y + 1));
            }
            return;
        }

        let (cursor_line, cursor_col) = self.cursor_position(inner_width);
        let scroll = cursor_line.saturating_add(1).saturating_sub(visible);

        let lines: Vec<Line> = hard_wrap(&self.buffer, inner_width)
            .into_iter()
            .map(Line::from)
            .collect();
        let text_style = if self.disabled {
            Style::default().fg(p.muted)
        } else {
            Style::default().fg(p.fg)
        };
        let input = Paragraph::new(lines)
            .style(text_style)
            .scroll((scroll, 0))
            .block(block);
        frame.render_widget(input, area);

        if self.shows_cursor() {
            frame.set_cursor_position((
                area.x.saturating_add(1).saturating_add(cursor_col.min(inner_width)),
                area.y.saturating_add(1).saturating_add(cursor_line.saturating_sub(scroll)),
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let text = text.replace("\r\n", "\n");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = self.prev_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = self.next_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

fn saturate(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Split on newlines, then break each line every `width` display columns.
fn hard_wrap(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width);
    let mut out = Vec::new();
    for logical in text.split('\n') {
        let mut line = String::new();
        let mut used = 0usize;
        for c in logical.chars() {
            let w = c.width().unwrap_or(0);
            if width > 0 && used + w > width && !line.is_empty() {
                out.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(c);
            used += w;
        }
        out.push(line);
    }
    out
}
