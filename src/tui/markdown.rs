//! Markdown → ratatui `Text` renderer for assistant answers.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`/`Span` values:
//! headings, emphasis, inline code, code blocks, lists, block quotes, and
//! links (URL appended in parentheses). Anything else is dropped.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::tui::theme::Palette;

pub fn render(content: &str, palette: &Palette) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut w = Writer::new(*palette);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.text
}

struct Writer {
    text: Text<'static>,
    palette: Palette,
    /// Nested inline styles; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Per-line prefix spans (block quotes, code blocks).
    prefixes: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = numbered list at n.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    link: Option<String>,
    pending_blank: bool,
}

impl Writer {
    fn new(palette: Palette) -> Self {
        Self {
            text: Text::default(),
            palette,
            styles: Vec::new(),
            prefixes: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
            link: None,
            pending_blank: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.palette.fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn new_line(&mut self) {
        let mut line = Line::default();
        line.spans.extend(self.prefixes.iter().cloned());
        self.text.lines.push(line);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.text.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn start_block(&mut self) {
        if self.pending_blank {
            self.new_line();
            self.pending_blank = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = Style::default().fg(self.palette.fg).bg(self.palette.code_bg);
                self.push_span(Span::styled(c.to_string(), style));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.push_line_text("─".repeat(30), Style::default().fg(self.palette.muted));
                self.pending_blank = true;
            }
            _ => {}
        }
    }

    fn push_line_text(&mut self, content: String, style: Style) {
        self.new_line();
        self.push_span(Span::styled(content, style));
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.start_block();
                // List items already opened their line
                if self.lists.is_empty() {
                    self.new_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                let modifier = match level {
                    HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
                    HeadingLevel::H2 => Modifier::BOLD,
                    _ => Modifier::BOLD | Modifier::ITALIC,
                };
                self.push_style(Style::default().fg(self.palette.accent).add_modifier(modifier));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.prefixes
                    .push(Span::styled("│ ", Style::default().fg(self.palette.accent)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.prefixes
                    .push(Span::styled("│ ", Style::default().fg(self.palette.muted)));
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.push_span(Span::styled(marker, Style::default().fg(self.palette.accent)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(Style::default().add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_blank = self.lists.is_empty(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.pending_blank = true;
            }
            TagEnd::BlockQuote(_) => {
                self.prefixes.pop();
                self.styles.pop();
                self.pending_blank = true;
            }
            TagEnd::CodeBlock => {
                self.prefixes.pop();
                self.in_code_block = false;
                self.pending_blank = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_blank = self.lists.is_empty();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link.take() {
                    let style = Style::default().fg(self.palette.muted);
                    self.push_span(Span::styled(format!(" ({url})"), style));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if self.in_code_block {
            let style = Style::default().fg(self.palette.fg).bg(self.palette.code_bg);
            for line in text.lines() {
                self.push_line_text(line.to_string(), style);
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Theme;

    fn palette() -> Palette {
        Palette::for_theme(Theme::Light)
    }

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_is_bold_accent() {
        let p = palette();
        let text = render("## Zakat", &p);
        let span = text.lines[0].spans.iter().find(|s| s.content == "Zakat").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(p.accent));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Pray **five** times", &palette());
        let span = text.lines[0].spans.iter().find(|s| s.content == "five").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn numbered_list_markers() {
        let text = render("1. Shahada\n2. Salah\n3. Zakat", &palette());
        let lines = plain(&text);
        assert_eq!(lines, vec!["1. Shahada", "2. Salah", "3. Zakat"]);
    }

    #[test]
    fn bullet_list_markers() {
        let lines = plain(&render("- Fajr\n- Dhuhr", &palette()));
        assert_eq!(lines, vec!["• Fajr", "• Dhuhr"]);
    }

    #[test]
    fn blockquote_is_prefixed() {
        let lines = plain(&render("> Indeed, with hardship comes ease.", &palette()));
        assert!(lines.iter().any(|l| l.starts_with("│ ") && l.contains("hardship")));
    }

    #[test]
    fn paragraphs_are_separated() {
        let lines = plain(&render("First.\n\nSecond.", &palette()));
        assert_eq!(lines, vec!["First.", "", "Second."]);
    }

    #[test]
    fn code_block_lines_keep_prefix_and_expand_tabs() {
        let lines = plain(&render("```\n\tindented\nplain\n```", &palette()));
        assert_eq!(lines, vec!["│     indented", "│ plain"]);
    }

    #[test]
    fn link_url_is_appended() {
        let lines = plain(&render("See [sunnah.com](https://sunnah.com)", &palette()));
        assert_eq!(lines, vec!["See sunnah.com (https://sunnah.com)"]);
    }
}
