//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, controller results, app events and a periodic
//! tick on the runtime's main task. All `App` mutation happens here.

use crate::app::{App, AppEvent};
use crate::controller::ControllerEvent;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

use super::input::handle_input;
use super::render::{render, SPINNER_FRAMES};

const TICK: Duration = Duration::from_millis(250);

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Raw-mode alternate screen, restored on drop so early returns and `?`
/// never leave the shell unusable.
struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "Failed to disable raw mode");
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            tracing::warn!(error = %e, "Failed to leave alternate screen");
        }
        let _ = self.terminal.show_cursor();
    }
}

/// SIGTERM/SIGINT on Unix, Ctrl-C elsewhere.
struct ShutdownSignals {
    #[cfg(unix)]
    term: tokio::signal::unix::Signal,
    #[cfg(unix)]
    int: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    /// Resolves with the signal name once a shutdown signal arrives.
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self {})
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl-C",
            Err(_) => std::future::pending().await,
        }
    }
}

/// Runs the TUI until the user quits or a shutdown signal arrives.
///
/// Mounts the pages (initial fetches and health check) once the terminal is
/// ready. Installs a panic hook that restores the terminal before the default
/// hook prints.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
    mut controller_rx: mpsc::Receiver<ControllerEvent>,
) -> Result<()> {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut tui = Tui::enter()?;
    let mut signals = ShutdownSignals::install()?;
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    app.start(&event_tx);

    loop {
        if app.needs_redraw {
            tui.terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Apply everything already settled before blocking, so results are
        // not starved by fast typing.
        while let Ok(event) = controller_rx.try_recv() {
            if app.handle_controller_event(event) {
                app.needs_redraw = true;
            }
        }
        while let Ok(event) = event_rx.try_recv() {
            app.handle_app_event(event);
            app.needs_redraw = true;
        }

        tokio::select! {
            biased;

            name = signals.recv() => {
                tracing::info!(signal = name, "Shutting down");
                break;
            }

            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                    app.needs_redraw = true;
                    if let Action::Quit = handle_input(app, key.code, key.modifiers) {
                        break;
                    }
                }
                Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Terminal input stream failed");
                    break;
                }
                None => break,
            },

            Some(event) = controller_rx.recv() => {
                if app.handle_controller_event(event) {
                    app.needs_redraw = true;
                }
            }

            Some(event) = event_rx.recv() => {
                app.handle_app_event(event);
                app.needs_redraw = true;
            }

            _ = ticker.tick() => on_tick(app),
        }
    }

    drop(tui);
    Ok(())
}

/// Spinner animation while anything visible is loading, plus the debounced
/// search.
fn on_tick(app: &mut App) {
    if app.is_busy() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
    if app.apply_debounced_search() {
        app.needs_redraw = true;
    }
}
