//! TUI (Terminal User Interface) module for RAGScope.
//!
//! Provides the interactive control panel: question input, parameter sliders,
//! and the inspection panels of the last loaded result.

pub mod app;
pub mod callback;
pub mod event;
pub mod theme;
pub mod widgets;

use app::App;
use ragscope_core::RagscopeConfig;

/// Run the TUI application.
pub async fn run(config: RagscopeConfig) -> anyhow::Result<()> {
    let mut app = App::new(&config)?;

    // Setup terminal
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableBracketedPaste
    )?;

    let backend = ratatui::backend::CrosstermBackend::new(std::io::stdout());
    let mut terminal = ratatui::Terminal::new(backend)?;
    terminal.clear()?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableBracketedPaste,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
