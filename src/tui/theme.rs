//! Color palettes for the light and dark themes.

use ratatui::style::Color;

use crate::core::state::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub border: Color,
    /// Background of the selected sidebar row.
    pub highlight: Color,
    pub danger: Color,
    pub code_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(250, 250, 247),
                fg: Color::Rgb(33, 37, 41),
                muted: Color::Rgb(108, 117, 125),
                accent: Color::Rgb(5, 150, 105),
                user: Color::Rgb(37, 99, 235),
                border: Color::Rgb(206, 212, 218),
                highlight: Color::Rgb(209, 250, 229),
                danger: Color::Rgb(220, 38, 38),
                code_bg: Color::Rgb(233, 236, 239),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(17, 24, 39),
                fg: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(156, 163, 175),
                accent: Color::Rgb(52, 211, 153),
                user: Color::Rgb(96, 165, 250),
                border: Color::Rgb(55, 65, 81),
                highlight: Color::Rgb(6, 78, 59),
                danger: Color::Rgb(248, 113, 113),
                code_bg: Color::Rgb(31, 41, 55),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_differ() {
        let light = Palette::for_theme(Theme::Light);
        let dark = Palette::for_theme(Theme::Dark);
        assert_ne!(light.bg, dark.bg);
        assert_ne!(light.fg, dark.fg);
    }
}
