//! Terminal lifecycle and the main event loop.
//!
//! The loop multiplexes three inputs with `tokio::select!`: unix signals,
//! terminal events from crossterm's [`EventStream`], and [`AppEvent`]s from
//! spawned workers. Drawing is lazy; a frame is rendered only when something
//! set `needs_redraw`.

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::{App, AppEvent, Overlay};

use super::events::handle_app_event;
use super::input::handle_input;
use super::layout;
use super::render::render;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// What the input handler wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // restore the terminal even if we panic mid-frame
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, event_tx, event_rx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")
}

async fn event_loop(
    terminal: &mut Tui,
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut term_events = EventStream::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        let size = terminal.size()?;
        sync_viewports(app, Rect::new(0, 0, size.width, size.height));

        // apply any results that arrived while we were drawing
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event).await?;
        }

        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            biased;

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            maybe_event = term_events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.needs_redraw = true;
                        if handle_input(app, key.code, key.modifiers, &event_tx).await?
                            == Action::Quit
                        {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => {
                        app.needs_redraw = true;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("terminal event stream failed"),
                    None => break,
                }
            }
            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event).await?;
            }
        }
    }

    Ok(())
}

/// Pushes the current terminal geometry into the list widgets so navigation
/// and pagination agree with what will be drawn.
fn sync_viewports(app: &mut App, area: Rect) {
    let panels = layout::panels(area);

    let (w, h) = layout::interior(panels.sources);
    app.sources.set_viewport(w, h);

    let (w, h) = layout::interior(panels.news);
    app.news.set_viewport(w, h);

    if let Some(Overlay::Content(list)) = &mut app.overlay {
        let (w, h) = layout::interior(layout::content_overlay(area));
        list.set_viewport(w, h);
    }
}
