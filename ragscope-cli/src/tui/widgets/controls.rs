//! Control area: the question input, the three parameter sliders, and the error
//! banner shown for a failed submission.

use crate::tui::event::Focus;
use crate::tui::theme::Theme;
use crossterm::event::{Event, KeyCode, KeyEvent};
use ragscope_core::{Param, Parameters};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use tui_textarea::TextArea;

const QUERY_HEIGHT: u16 = 3;
const SLIDERS_HEIGHT: u16 = 3;
const BANNER_HEIGHT: u16 = 3;

/// Height the control area needs, depending on whether an error is shown.
pub fn controls_height(has_error: bool) -> u16 {
    QUERY_HEIGHT + SLIDERS_HEIGHT + if has_error { BANNER_HEIGHT } else { 0 }
}

/// Single-line question input wrapping tui-textarea.
pub struct QueryInput {
    textarea: TextArea<'static>,
}

impl QueryInput {
    pub fn new(initial: &str, theme: &Theme) -> Self {
        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        textarea.set_style(Style::default().fg(theme.fg).bg(theme.bg));
        textarea.set_placeholder_text("Ask a question about the indexed documents");
        textarea.insert_str(initial);
        let mut input = Self { textarea };
        input.set_focused(true, theme);
        input
    }

    /// Get the current input text.
    pub fn text(&self) -> String {
        self.textarea.lines().join(" ")
    }

    /// Set the input text.
    pub fn set_text(&mut self, text: &str) {
        self.textarea.select_all();
        self.textarea.cut();
        self.textarea.insert_str(single_line(text));
    }

    /// Update border and cursor for the focus state.
    pub fn set_focused(&mut self, focused: bool, theme: &Theme) {
        self.textarea.set_block(
            Block::default()
                .title(" Question ")
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused)),
        );
        let cursor = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.textarea.set_cursor_style(cursor);
    }

    /// Feed a terminal event to the textarea. Returns true if the text changed.
    ///
    /// Newlines never enter the query: pasted text is flattened and Enter is
    /// left to the caller.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Paste(text) => {
                self.textarea.insert_str(single_line(text));
                true
            }
            Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            }) => false,
            Event::Key(_) => self.textarea.input(event.clone()),
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&self.textarea, area);
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Render the query input, the sliders and, when `error` is set, the error banner.
pub fn render_controls(
    frame: &mut Frame,
    area: Rect,
    query: &QueryInput,
    params: &Parameters,
    focus: Focus,
    error: Option<&str>,
    theme: &Theme,
) {
    let [query_area, sliders_area, banner_area] = Layout::vertical([
        Constraint::Length(QUERY_HEIGHT),
        Constraint::Length(SLIDERS_HEIGHT),
        Constraint::Min(0),
    ])
    .areas(area);

    query.render(frame, query_area);

    let slider_areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(sliders_area);
    for (param, slider_area) in Param::ALL.into_iter().zip(slider_areas.iter()) {
        render_slider(
            frame,
            *slider_area,
            param,
            params.get(param),
            focus == Focus::Slider(param),
            theme,
        );
    }

    if let Some(message) = error {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("✗ ", theme.error_style()),
            Span::styled(message.to_string(), Style::default().fg(theme.error_fg)),
        ]))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error_fg)),
        );
        frame.render_widget(banner, banner_area);
    }
}

fn render_slider(
    frame: &mut Frame,
    area: Rect,
    param: Param,
    value: u32,
    focused: bool,
    theme: &Theme,
) {
    let range = param.range();
    let title = if focused {
        format!(" ◂ {} ▸ ", param.label())
    } else {
        format!(" {} ", param.label())
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused)),
        )
        .gauge_style(theme.gauge_style())
        .ratio(range.ratio(value))
        .label(format!("{}  ({}–{})", value, range.min, range.max));
    frame.render_widget(gauge, area);
}
