//! Theme system for the RAGScope TUI.
//!
//! Provides dark and light color palettes, loaded from UiConfig.theme.

use ragscope_core::render::ScoreBand;
use ratatui::style::{Color, Modifier, Style};

/// Complete color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted_fg: Color,

    // Status colors
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,

    // UI chrome
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub border_color: Color,
    pub focus_border_color: Color,
    pub selection_bg: Color,
    pub gauge_fg: Color,

    // Similarity score bands
    pub score_high_fg: Color,
    pub score_low_fg: Color,
}

impl Theme {
    /// Create the default dark theme.
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            accent: Color::Rgb(137, 180, 250),
            muted_fg: Color::Rgb(127, 132, 156),

            error_fg: Color::Rgb(243, 139, 168),
            warning_fg: Color::Rgb(250, 179, 135),
            success_fg: Color::Rgb(166, 227, 161),

            header_bg: Color::Rgb(24, 24, 37),
            header_fg: Color::Rgb(205, 214, 244),
            status_bar_bg: Color::Rgb(24, 24, 37),
            status_bar_fg: Color::Rgb(166, 173, 200),
            border_color: Color::Rgb(69, 71, 90),
            focus_border_color: Color::Rgb(137, 180, 250),
            selection_bg: Color::Rgb(69, 71, 90),
            gauge_fg: Color::Rgb(116, 199, 236),

            score_high_fg: Color::Rgb(166, 227, 161),
            score_low_fg: Color::Rgb(250, 179, 135),
        }
    }

    /// Create the light theme.
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            bg: Color::Rgb(239, 241, 245),
            fg: Color::Rgb(76, 79, 105),
            accent: Color::Rgb(30, 102, 245),
            muted_fg: Color::Rgb(140, 143, 161),

            error_fg: Color::Rgb(210, 15, 57),
            warning_fg: Color::Rgb(254, 100, 11),
            success_fg: Color::Rgb(64, 160, 43),

            header_bg: Color::Rgb(220, 224, 232),
            header_fg: Color::Rgb(76, 79, 105),
            status_bar_bg: Color::Rgb(220, 224, 232),
            status_bar_fg: Color::Rgb(92, 95, 119),
            border_color: Color::Rgb(172, 176, 190),
            focus_border_color: Color::Rgb(30, 102, 245),
            selection_bg: Color::Rgb(188, 192, 204),
            gauge_fg: Color::Rgb(4, 165, 229),

            score_high_fg: Color::Rgb(64, 160, 43),
            score_low_fg: Color::Rgb(223, 142, 29),
        }
    }

    /// Load a theme by name from config. Falls back to dark.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    // -- Convenience style constructors --

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(self.header_fg).bg(self.header_bg)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted_fg)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Border style for a block, highlighted when it holds the focus.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border_color)
        } else {
            Style::default().fg(self.border_color)
        }
    }

    pub fn gauge_style(&self) -> Style {
        Style::default().fg(self.gauge_fg).bg(self.selection_bg)
    }

    /// Color for a similarity score row in the full score list.
    pub fn score_band_color(&self, band: ScoreBand) -> Color {
        match band {
            ScoreBand::High => self.score_high_fg,
            ScoreBand::Low => self.score_low_fg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let theme = Theme::dark();
        assert_eq!(theme.name, "dark");
        assert_eq!(theme.bg, Color::Rgb(30, 30, 46));
    }

    #[test]
    fn test_light_theme_creation() {
        let theme = Theme::light();
        assert_eq!(theme.name, "light");
        assert_eq!(theme.bg, Color::Rgb(239, 241, 245));
    }

    #[test]
    fn test_from_name_light() {
        assert_eq!(Theme::from_name("light").name, "light");
    }

    #[test]
    fn test_from_name_unknown_defaults_to_dark() {
        assert_eq!(Theme::from_name("solarized").name, "dark");
    }

    #[test]
    fn test_base_style() {
        let theme = Theme::dark();
        let style = theme.base_style();
        assert_eq!(style.fg, Some(theme.fg));
        assert_eq!(style.bg, Some(theme.bg));
    }

    #[test]
    fn test_focused_border_differs() {
        let theme = Theme::dark();
        assert_ne!(theme.border_style(true), theme.border_style(false));
    }

    #[test]
    fn test_score_band_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.score_band_color(ScoreBand::High), theme.score_high_fg);
        assert_eq!(theme.score_band_color(ScoreBand::Low), theme.score_low_fg);
    }

    #[test]
    fn test_error_style_is_bold() {
        let theme = Theme::dark();
        assert!(theme.error_style().add_modifier.contains(Modifier::BOLD));
    }
}
