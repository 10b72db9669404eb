//! Terminal setup and the watch screen event loop

use std::io::{stdout, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::WatchApp;
use crate::playback::element::MediaElement;
use crate::ui;

/// Terminal type alias for convenience
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long to wait for terminal input before applying async outcomes
const TICK_RATE: Duration = Duration::from_millis(100);

/// Initialize the terminal for the watch screen
pub fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the watch screen until the user closes it or the series ends
pub async fn run<E: MediaElement>(app: &mut WatchApp<E>) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = event_loop(&mut terminal, app).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Render, read input, then apply whatever resolved in the meantime
async fn event_loop<E: MediaElement>(terminal: &mut Tui, app: &mut WatchApp<E>) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::player::render(frame, app))?;

        if event::poll(TICK_RATE)? {
            match event::read()? {
                // Only handle key press events (ignore releases on Windows)
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key).await,
                Event::Mouse(mouse) => {
                    let width = terminal.size()?.width;
                    app.handle_mouse(mouse, width).await;
                }
                _ => {}
            }
        }

        app.pump().await;
    }

    Ok(())
}
