//! Status bar widget showing keybinding hints for the focused area.

use crate::tui::event::Focus;
use crate::tui::theme::Theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

fn hints(focus: Focus) -> &'static str {
    match focus {
        Focus::Query => "[Enter] Run │ [Tab] Next │ [Ctrl+C] Quit",
        Focus::Slider(_) => "[←→] Adjust │ [Enter] Run │ [Tab] Next │ [Ctrl+C] Quit",
        Focus::Panels => {
            "[1-6] Panel │ [←→] Document │ [Space] Expand │ [↑↓/PgUp/PgDn] Scroll │ [Enter] Run │ [Ctrl+C] Quit"
        }
    }
}

/// Render the status bar.
pub fn render_status_bar(frame: &mut Frame, area: Rect, focus: Focus, theme: &Theme) {
    let spans = vec![
        Span::styled(
            format!(" {} ", focus.label()),
            theme
                .status_bar_style()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", theme.status_bar_style()),
        Span::styled(hints(focus), theme.status_bar_style()),
    ];

    let bar = Paragraph::new(Line::from(spans)).style(theme.status_bar_style());
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragscope_core::Param;

    #[test]
    fn test_hints_per_focus() {
        assert!(hints(Focus::Query).contains("Enter"));
        assert!(hints(Focus::Slider(Param::TopK)).contains("Adjust"));
        assert!(hints(Focus::Panels).contains("Space"));
        assert!(hints(Focus::Panels).contains("Document"));
    }

    #[test]
    fn test_render_status_bar_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        for focus in Focus::ORDER {
            terminal
                .draw(|frame| {
                    render_status_bar(frame, frame.area(), focus, &theme);
                })
                .unwrap();
        }
    }
}
