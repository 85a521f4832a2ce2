//! Terminal event handling using crossterm EventStream.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers};
use futures::StreamExt;
use ragscope_core::{Param, StepDirection};

/// Which part of the screen receives keys that are not global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Query,
    Slider(Param),
    Panels,
}

impl Focus {
    pub const ORDER: [Focus; 5] = [
        Focus::Query,
        Focus::Slider(Param::ChunkSize),
        Focus::Slider(Param::ChunkOverlap),
        Focus::Slider(Param::TopK),
        Focus::Panels,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    /// Short display label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Slider(Param::ChunkSize) => "CHUNK",
            Self::Slider(Param::ChunkOverlap) => "OVERLAP",
            Self::Slider(Param::TopK) => "TOP-K",
            Self::Panels => "PANELS",
        }
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// High-level actions the TUI can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Submit,
    FocusNext,
    FocusPrev,
    Step(Param, StepDirection),
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToTop,
    SelectPanel(usize),
    /// Move the document cursor up or down one entry.
    PrevEntry,
    NextEntry,
    ToggleCollapse,
}

/// Reads terminal events asynchronously using crossterm's EventStream.
pub struct EventHandler {
    stream: EventStream,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            stream: EventStream::new(),
        }
    }

    /// Read the next terminal event. Returns None if the stream ends.
    pub async fn next(&mut self) -> Option<Event> {
        self.stream.next().await.and_then(|r| r.ok())
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys that mean the same thing whatever holds the focus.
pub fn map_global_key(event: &KeyEvent) -> Option<Action> {
    match (event.modifiers, event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(Action::Quit),
        (_, KeyCode::Tab) => Some(Action::FocusNext),
        (_, KeyCode::BackTab) => Some(Action::FocusPrev),
        (KeyModifiers::NONE, KeyCode::Enter) => Some(Action::Submit),
        _ => None,
    }
}

/// Map a key for the focused area.
/// Returns None if the event should be passed to the query input.
pub fn map_focus_key(focus: Focus, event: &KeyEvent) -> Option<Action> {
    match focus {
        Focus::Query => None,
        Focus::Slider(param) => match event.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
                Some(Action::Step(param, StepDirection::Down))
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => {
                Some(Action::Step(param, StepDirection::Up))
            }
            _ => None,
        },
        Focus::Panels => match event.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Home => Some(Action::ScrollToTop),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevEntry),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::NextEntry),
            KeyCode::Char(' ') => Some(Action::ToggleCollapse),
            KeyCode::Char(c @ '1'..='6') => Some(Action::SelectPanel(c as usize - '1' as usize)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_ctrl_c_and_ctrl_d_quit() {
        assert_eq!(map_global_key(&ctrl(KeyCode::Char('c'))), Some(Action::Quit));
        assert_eq!(map_global_key(&ctrl(KeyCode::Char('d'))), Some(Action::Quit));
    }

    #[test]
    fn test_enter_submits() {
        assert_eq!(map_global_key(&key(KeyCode::Enter)), Some(Action::Submit));
    }

    #[test]
    fn test_tab_cycles_focus() {
        assert_eq!(map_global_key(&key(KeyCode::Tab)), Some(Action::FocusNext));
        assert_eq!(
            map_global_key(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::FocusPrev)
        );
    }

    #[test]
    fn test_regular_key_not_global() {
        assert_eq!(map_global_key(&key(KeyCode::Char('a'))), None);
    }

    #[test]
    fn test_focus_order_wraps() {
        assert_eq!(Focus::Query.next(), Focus::Slider(Param::ChunkSize));
        assert_eq!(Focus::Panels.next(), Focus::Query);
        assert_eq!(Focus::Query.prev(), Focus::Panels);
    }

    #[test]
    fn test_query_focus_passes_keys_through() {
        assert_eq!(map_focus_key(Focus::Query, &key(KeyCode::Left)), None);
        assert_eq!(map_focus_key(Focus::Query, &key(KeyCode::Char('1'))), None);
    }

    #[test]
    fn test_slider_arrows_step() {
        let focus = Focus::Slider(Param::TopK);
        assert_eq!(
            map_focus_key(focus, &key(KeyCode::Right)),
            Some(Action::Step(Param::TopK, StepDirection::Up))
        );
        assert_eq!(
            map_focus_key(focus, &key(KeyCode::Left)),
            Some(Action::Step(Param::TopK, StepDirection::Down))
        );
    }

    #[test]
    fn test_panel_digits_select() {
        assert_eq!(
            map_focus_key(Focus::Panels, &key(KeyCode::Char('1'))),
            Some(Action::SelectPanel(0))
        );
        assert_eq!(
            map_focus_key(Focus::Panels, &key(KeyCode::Char('6'))),
            Some(Action::SelectPanel(5))
        );
        assert_eq!(map_focus_key(Focus::Panels, &key(KeyCode::Char('7'))), None);
    }

    #[test]
    fn test_panel_arrows_move_document_cursor() {
        assert_eq!(
            map_focus_key(Focus::Panels, &key(KeyCode::Left)),
            Some(Action::PrevEntry)
        );
        assert_eq!(
            map_focus_key(Focus::Panels, &key(KeyCode::Char('l'))),
            Some(Action::NextEntry)
        );
    }

    #[test]
    fn test_panel_space_toggles() {
        assert_eq!(
            map_focus_key(Focus::Panels, &key(KeyCode::Char(' '))),
            Some(Action::ToggleCollapse)
        );
    }
}
