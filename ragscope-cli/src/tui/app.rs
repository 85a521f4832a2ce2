//! Main TUI application: state, event loop, and top-level draw function.

use crate::tui::callback::{PipelineEvent, SubmissionDispatcher};
use crate::tui::event::{Action, EventHandler, Focus, map_focus_key, map_global_key};
use crate::tui::theme::Theme;
use crate::tui::widgets::controls::{QueryInput, controls_height, render_controls};
use crate::tui::widgets::header::{HeaderData, render_header};
use crate::tui::widgets::panels::{PanelsView, render_results};
use crate::tui::widgets::status_bar::render_status_bar;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ragscope_core::{
    Panels, Param, ParameterStore, Parameters, PipelineClient, RagscopeConfig, Session,
    SessionState, render_panels,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The main TUI application state.
pub struct App {
    // Pipeline state
    store: ParameterStore,
    session: Session,
    client: PipelineClient,
    panels: Option<Panels>,

    // UI state
    pub theme: Theme,
    pub focus: Focus,
    query: QueryInput,
    panels_view: PanelsView,

    // Submission tasks
    dispatcher: SubmissionDispatcher,
    pipeline_rx: mpsc::UnboundedReceiver<PipelineEvent>,

    pub should_quit: bool,
}

impl App {
    /// Create a new TUI application from the loaded configuration.
    pub fn new(config: &RagscopeConfig) -> ragscope_core::Result<Self> {
        let client = PipelineClient::from_config(&config.backend)?;
        Ok(Self::with_client(
            client,
            config.defaults.to_parameters(),
            &config.ui.theme,
        ))
    }

    /// Create an application around an existing client.
    pub fn with_client(client: PipelineClient, params: Parameters, theme_name: &str) -> Self {
        let theme = Theme::from_name(theme_name);
        let query = QueryInput::new(params.query(), &theme);
        let (dispatcher, pipeline_rx) = SubmissionDispatcher::new();
        Self {
            store: ParameterStore::new(params),
            session: Session::new(),
            client,
            panels: None,
            theme,
            focus: Focus::Query,
            query,
            panels_view: PanelsView::new(),
            dispatcher,
            pipeline_rx,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn params(&self) -> &Parameters {
        self.store.params()
    }

    /// Run the main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_handler = EventHandler::new();
        let tick_rate = std::time::Duration::from_millis(250);

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                // Terminal events
                event = event_handler.next() => {
                    match event {
                        Some(event) => self.handle_terminal_event(event),
                        None => self.should_quit = true,
                    }
                }
                // Submission outcomes
                event = self.pipeline_rx.recv() => {
                    if let Some(event) = event {
                        self.handle_pipeline_event(event);
                    }
                }
                // Tick
                _ = tokio::time::sleep(tick_rate) => {}
            }

            if self.should_quit {
                self.dispatcher.abort();
                break;
            }
        }

        Ok(())
    }

    /// Draw the full UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let error = self.session.error();
        let [header_area, controls_area, results_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(controls_height(error.is_some())),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let header = HeaderData::new(&self.client, self.session.state());
        render_header(frame, header_area, &header, &self.theme);

        render_controls(
            frame,
            controls_area,
            &self.query,
            self.store.params(),
            self.focus,
            error,
            &self.theme,
        );

        match &self.panels {
            Some(panels) => render_results(
                frame,
                results_area,
                panels,
                &mut self.panels_view,
                self.focus == Focus::Panels,
                &self.theme,
            ),
            None => self.render_placeholder(frame, results_area),
        }

        render_status_bar(frame, status_area, self.focus, &self.theme);
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let message = match self.session.state() {
            SessionState::Idle => "Enter a question and press Enter to run the pipeline.",
            SessionState::Submitting { .. } => "⟳ Running the pipeline…",
            SessionState::Failed { .. } => "No results. Adjust the inputs and press Enter to retry.",
            SessionState::Loaded { .. } => "",
        };
        let paragraph = Paragraph::new(Line::styled(message, self.theme.muted_style()))
            .style(self.theme.base_style())
            .block(
                Block::default()
                    .title(" Results ")
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style(self.focus == Focus::Panels)),
            );
        frame.render_widget(paragraph, area);
    }

    /// Handle a terminal event (keyboard, paste, resize).
    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Paste(_) if self.focus == Focus::Query => self.feed_query(&event),
            _ => {} // ratatui redraws on next frame
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if let Some(action) = map_global_key(&key).or_else(|| map_focus_key(self.focus, &key)) {
            self.execute_action(action);
            return;
        }
        if self.focus == Focus::Query {
            self.feed_query(&Event::Key(key));
        }
    }

    fn feed_query(&mut self, event: &Event) {
        if self.query.handle_event(event) {
            self.store.set_query(self.query.text());
        }
    }

    fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Submit => self.submit(),
            Action::FocusNext => self.set_focus(self.focus.next()),
            Action::FocusPrev => self.set_focus(self.focus.prev()),
            Action::Step(param, direction) => {
                let value = self.store.step(param, direction);
                debug!(%param, value, "Parameter changed");
                if param == Param::TopK {
                    self.refresh_panels();
                }
            }
            Action::ScrollUp => self.panels_view.scroll_by(-1),
            Action::ScrollDown => self.panels_view.scroll_by(1),
            Action::PageUp => self.panels_view.page_up(),
            Action::PageDown => self.panels_view.page_down(),
            Action::ScrollToTop => self.panels_view.scroll_to_top(),
            Action::SelectPanel(index) => self.panels_view.select(index),
            Action::PrevEntry => {
                self.panels_view.move_entry(-1);
            }
            Action::NextEntry => {
                self.panels_view.move_entry(1);
            }
            Action::ToggleCollapse => {
                self.panels_view.toggle_selected();
            }
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.query.set_focused(focus == Focus::Query, &self.theme);
    }

    /// Submit the current parameters. Any earlier submission is superseded.
    fn submit(&mut self) {
        self.panels = None;
        match self.session.begin(&self.store.snapshot()) {
            Some((ticket, payload)) => {
                info!(
                    %ticket,
                    chunk_size = payload.chunk_size,
                    chunk_overlap = payload.chunk_overlap,
                    top_k = payload.top_k,
                    protocol = %self.client.protocol(),
                    "Submitting query"
                );
                self.panels_view.reset();
                self.dispatcher.dispatch(&self.client, ticket, payload);
            }
            None => self.dispatcher.abort(),
        }
    }

    /// Apply a submission outcome. Outcomes of superseded submissions are dropped.
    pub fn handle_pipeline_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Completed { ticket, outcome } => {
                if self.session.complete(ticket, outcome) {
                    self.refresh_panels();
                }
            }
        }
    }

    /// Rebuild the panels from the session state. The chunk list follows the
    /// current top-k slider, so a loaded result reacts to it without a new run.
    fn refresh_panels(&mut self) {
        self.panels = render_panels(self.session.state(), self.store.top_k());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ragscope_core::render::{ChunksPanel, PanelKind};
    use ragscope_core::result::ChunkId;
    use ragscope_core::{
        MockBackend, Param, PipelineResult, Protocol, RagscopeError, ScoredChunk,
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_app(backend: Arc<MockBackend>) -> App {
        let client = PipelineClient::new(backend, Protocol::SinglePhase);
        App::with_client(client, Parameters::default(), "dark")
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_terminal_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App) {
        let event = app.pipeline_rx.recv().await.unwrap();
        app.handle_pipeline_event(event);
    }

    fn draw_text(app: &mut App) -> String {
        let backend = ratatui::backend::TestBackend::new(100, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample_result() -> PipelineResult {
        PipelineResult {
            top_k_chunks: Some(vec![ScoredChunk {
                score: Some(0.8123),
                file: Some("a.txt".into()),
                chunk_id: Some(ChunkId::Index(0)),
                text: Some("...".into()),
            }]),
            answer: Some("X is Y.".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_app_creation() {
        let app = test_app(Arc::new(MockBackend::new()));
        assert!(!app.should_quit);
        assert_eq!(app.focus, Focus::Query);
        assert_eq!(app.state(), &SessionState::Idle);
        assert_eq!(app.params().chunk_size(), 120);
    }

    #[tokio::test]
    async fn test_draw_idle_does_not_panic() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        let text = draw_text(&mut app);
        assert!(text.contains("Enter a question"));
    }

    #[tokio::test]
    async fn test_typing_updates_store() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        type_text(&mut app, "What is X?");
        assert_eq!(app.params().query(), "What is X?");
    }

    #[tokio::test]
    async fn test_blank_submit_fails_without_request() {
        let backend = Arc::new(MockBackend::new());
        let mut app = test_app(backend.clone());
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.state(), SessionState::Failed { .. }));
        assert!(backend.requests().is_empty());
        assert!(draw_text(&mut app).contains("Please enter a question"));
    }

    #[tokio::test]
    async fn test_submit_loads_panels() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(sample_result()));
        let mut app = test_app(backend.clone());
        type_text(&mut app, "What is X?");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.state(), SessionState::Submitting { .. }));

        settle(&mut app).await;
        assert!(matches!(app.state(), SessionState::Loaded { .. }));
        assert_eq!(backend.requests()[0].query, "What is X?");

        let text = draw_text(&mut app);
        assert!(text.contains("0.8123"));
        assert!(text.contains("X is Y."));
    }

    #[tokio::test]
    async fn test_backend_failure_shows_banner_and_no_panels() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Err(RagscopeError::backend(500, "internal error")));
        let mut app = test_app(backend);
        type_text(&mut app, "What is X?");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert!(app.panels.is_none());
        let text = draw_text(&mut app);
        assert!(text.contains("internal error"));
        assert!(!text.contains("Top-K Chunks"));
    }

    #[tokio::test]
    async fn test_resubmit_supersedes_slow_submission() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_delayed(Duration::from_secs(5), Ok(PipelineResult {
            answer: Some("stale".into()),
            ..Default::default()
        }));
        backend.queue(Ok(sample_result()));
        let mut app = test_app(backend);
        type_text(&mut app, "first");
        press(&mut app, KeyCode::Enter);
        tokio::time::sleep(Duration::from_millis(50)).await;
        press(&mut app, KeyCode::Enter);

        settle(&mut app).await;
        let text = draw_text(&mut app);
        assert!(text.contains("X is Y."));
        assert!(!text.contains("stale"));
    }

    #[tokio::test]
    async fn test_controls_stay_interactive_while_submitting() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_delayed(Duration::from_secs(5), Ok(sample_result()));
        let mut app = test_app(backend);
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.params().chunk_size(), 130);
        assert!(matches!(app.state(), SessionState::Submitting { .. }));
    }

    #[tokio::test]
    async fn test_tab_cycles_focus() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Slider(Param::ChunkSize));
        app.handle_terminal_event(Event::Key(KeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::SHIFT,
        )));
        assert_eq!(app.focus, Focus::Query);
    }

    #[tokio::test]
    async fn test_slider_keys_clamp() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        app.set_focus(Focus::Slider(Param::TopK));
        for _ in 0..20 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.params().top_k(), 12);
        // Typed characters do not leak into the query while a slider has focus.
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.params().query(), "");
    }

    #[tokio::test]
    async fn test_panel_keys_select_and_toggle() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(sample_result()));
        let mut app = test_app(backend);
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        app.set_focus(Focus::Panels);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.panels_view.selected(), PanelKind::Scores);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.panels_view.is_expanded(PanelKind::Scores));
    }

    #[tokio::test]
    async fn test_documents_expand_one_entry_at_a_time() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(PipelineResult {
            documents: Some(BTreeMap::from([
                ("alpha.txt".to_string(), "alpha body".to_string()),
                ("beta.txt".to_string(), "beta body".to_string()),
            ])),
            ..Default::default()
        }));
        let mut app = test_app(backend);
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        app.set_focus(Focus::Panels);
        press(&mut app, KeyCode::Char('1'));
        draw_text(&mut app);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        let text = draw_text(&mut app);
        assert!(text.contains("beta body"));
        assert!(!text.contains("alpha body"));
        assert!(text.contains("▸ alpha.txt"));
    }

    #[tokio::test]
    async fn test_top_k_slider_limits_loaded_chunks() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(PipelineResult {
            top_k_chunks: Some(
                (0..4)
                    .map(|i| ScoredChunk {
                        score: Some(0.9 - i as f64 / 10.0),
                        file: Some("a.txt".into()),
                        chunk_id: Some(ChunkId::Index(i)),
                        text: Some(format!("chunk text {}", i)),
                    })
                    .collect(),
            ),
            ..Default::default()
        }));
        let mut app = test_app(backend);
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        let rows = |app: &App| match &app.panels.as_ref().unwrap().chunks {
            ChunksPanel::Entries { rows, hidden } => (rows.len(), *hidden),
            ChunksPanel::NoChunks => (0, 0),
        };
        assert_eq!(rows(&app), (4, 0));

        app.set_focus(Focus::Slider(Param::TopK));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.params().top_k(), 2);
        assert_eq!(rows(&app), (2, 2));
        assert!(draw_text(&mut app).contains("(+2 more beyond top-k)"));

        press(&mut app, KeyCode::Right);
        assert_eq!(rows(&app), (3, 1));
        assert!(matches!(app.state(), SessionState::Loaded { .. }));
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        app.handle_terminal_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_paste_goes_to_query() {
        let mut app = test_app(Arc::new(MockBackend::new()));
        app.handle_terminal_event(Event::Paste("What\nis X?".into()));
        assert_eq!(app.params().query(), "What is X?");
    }

    #[tokio::test]
    async fn test_new_from_config() {
        let config = RagscopeConfig::default();
        let app = App::new(&config).unwrap();
        assert_eq!(app.theme.name, "dark");
        assert_eq!(app.params().top_k(), 5);
    }
}
