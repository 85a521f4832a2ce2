//! Header bar widget showing the backend endpoint, protocol, and session state.

use crate::tui::theme::Theme;
use ragscope_core::{PipelineClient, SessionState};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Data needed to render the header bar.
#[derive(Debug, Clone)]
pub struct HeaderData {
    pub endpoint: String,
    pub protocol: String,
    pub state_label: &'static str,
    pub is_submitting: bool,
    pub is_failed: bool,
}

impl Default for HeaderData {
    fn default() -> Self {
        Self {
            endpoint: "unknown".to_string(),
            protocol: "two_phase".to_string(),
            state_label: "idle",
            is_submitting: false,
            is_failed: false,
        }
    }
}

impl HeaderData {
    pub fn new(client: &PipelineClient, state: &SessionState) -> Self {
        Self {
            endpoint: client.endpoint().to_string(),
            protocol: client.protocol().to_string(),
            state_label: state.label(),
            is_submitting: matches!(state, SessionState::Submitting { .. }),
            is_failed: matches!(state, SessionState::Failed { .. }),
        }
    }

    fn state_color(&self, theme: &Theme) -> Color {
        if self.is_failed {
            theme.error_fg
        } else if self.is_submitting {
            theme.warning_fg
        } else {
            theme.success_fg
        }
    }
}

/// Render the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, data: &HeaderData, theme: &Theme) {
    let status_indicator = if data.is_submitting { "⟳" } else { "●" };
    let state_color = data.state_color(theme);
    let separator = || Span::styled(" │ ", theme.header_style().fg(theme.border_color));

    let spans = vec![
        Span::styled(
            format!(" {} RAGScope", status_indicator),
            theme
                .header_style()
                .add_modifier(Modifier::BOLD)
                .fg(state_color),
        ),
        separator(),
        Span::styled(
            data.endpoint.clone(),
            theme.header_style().add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(data.protocol.clone(), theme.header_style()),
        separator(),
        Span::styled(
            data.state_label,
            theme.header_style().fg(state_color),
        ),
    ];

    let header = Paragraph::new(Line::from(spans)).style(theme.header_style());
    frame.render_widget(header, area);
}
