//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! background task events, and periodic ticks.

use crate::app::{App, AppEvent, ContentState, SummaryState, View};
use crate::trending::TrendingPart;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::{apply_search_intent, dispatch_feed, load_trending};
use super::input::handle_input;
use super::mouse::handle_mouse;
use super::render::{render, SPINNER};

/// Tick period. Debounce deadlines and the strip animation are polled on
/// this clock.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Result of handling a key press event.
///
/// Returned by input handlers to signal whether the application should
/// continue running or terminate gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Terminal input**: keys and mouse from crossterm's async event stream
/// - **Background tasks**: API results via the `AppEvent` channel
/// - **Periodic tick**: 100ms timer for debounced search, the strip
///   centering animation, spinners and status expiry
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
///
/// # Returns
///
/// Returns `Ok(())` on graceful exit (user quit), or an error if terminal
/// setup fails.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    // Signal handlers for graceful shutdown (Unix only)
    // On non-Unix platforms, these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    start_initial_loads(app, &event_tx);

    loop {
        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        // Drain all pending app events before handling more input, so
        // results are not starved by rapid typing.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event, &event_tx);
        }

        // Platform-specific signal futures
        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;  // Process in order listed for predictable behavior

            // Signal handlers for graceful shutdown (highest priority)
            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            // Terminal input events
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        app.needs_redraw = true;
                        match handle_input(app, key.code, key.modifiers, &event_tx) {
                            Ok(Action::Quit) => break,
                            Ok(Action::Continue) => {}
                            Err(e) => app.set_status(format!("Error: {}", e)),
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => handle_mouse(app, mouse, &event_tx),
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => {
                        tracing::info!("Terminal event stream closed");
                        break;
                    }
                    _ => {}
                }
            }

            // Background task events (blocking recv for when queue was empty)
            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event, &event_tx);
            }

            _ = tick_interval.tick() => {
                handle_tick(app, Instant::now(), &event_tx);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// First page of the feed (restored category included) and the trending
/// sidebar.
fn start_initial_loads(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let fetch = app.feed.start(Instant::now());
    dispatch_feed(app, fetch, event_tx);
    load_trending(app, TrendingPart::Summary, false, event_tx);
}

/// Handle the periodic tick.
fn handle_tick(app: &mut App, now: Instant, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(intent) = app.debouncer.poll(now) {
        tracing::debug!(?intent, "Search input settled");
        apply_search_intent(app, intent, event_tx);
        app.needs_redraw = true;
    }

    if app.strip.tick() {
        app.needs_redraw = true;
    }

    if app.clear_expired_status(now) {
        app.needs_redraw = true;
    }

    if app.chat.take_scroll_request() {
        app.chat_scroll = usize::MAX;
        app.needs_redraw = true;
    }

    if is_anything_loading(app) {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER.len();
        app.needs_redraw = true;
    }
}

/// True while a spinner is visible somewhere on screen.
fn is_anything_loading(app: &App) -> bool {
    match app.view {
        View::Reader => {
            matches!(app.content_state, ContentState::Loading { .. })
                || matches!(app.summary, SummaryState::Loading { .. })
        }
        View::Feed => {
            app.feed.controller().is_loading()
                || app.chat.is_sending()
                || app.trending.is_loading(TrendingPart::Summary)
        }
        View::Bookmarks => app.bookmarks.is_list_loading(),
        View::Trending => {
            app.trending.is_loading(TrendingPart::Summary)
                || app.trending.is_loading(TrendingPart::Detail)
        }
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, DEFAULT_TIMEOUT};
    use crate::config::Config;
    use crate::session::SessionIdentity;
    use crate::storage::Database;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let api = ApiClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let session = SessionIdentity::parse("user_abc123def_loyw3v28").unwrap();
        App::new(api, db, session, &Config::default())
    }

    #[tokio::test]
    async fn tick_applies_settled_search() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(16);
        let start = Instant::now();
        app.debouncer.input("rust", start);

        handle_tick(&mut app, start + Duration::from_millis(100), &tx);
        assert_eq!(app.feed.controller().search(), "");

        handle_tick(&mut app, start + Duration::from_millis(300), &tx);
        assert_eq!(app.feed.controller().search(), "rust");
    }

    #[tokio::test]
    async fn tick_ignores_single_character_search() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(16);
        let start = Instant::now();
        app.debouncer.input("r", start);
        handle_tick(&mut app, start + Duration::from_secs(1), &tx);
        assert_eq!(app.feed.controller().search(), "");
        assert!(!app.debouncer.is_pending());
    }

    #[tokio::test]
    async fn tick_scrolls_chat_to_latest() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(16);
        app.chat.on_history(Vec::new());
        handle_tick(&mut app, Instant::now(), &tx);
        assert_eq!(app.chat_scroll, usize::MAX);
    }
}
