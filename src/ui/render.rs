//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::{
    articles, bookmark_list, categories, chat_panel, dashboard, error_panel, help, reader,
    search_bar, sidebar, status,
};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Terminal width from which the sidebar is always shown next to the list.
const SIDEBAR_MIN_WIDTH: u16 = 100;

/// Braille spinner frames, advanced by the tick while anything loads.
pub(super) const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER.len()]
}

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application state.
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        // For very small terminals (less than 3 lines), just show minimal message
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Feed => render_feed(f, app, chunks[0]),
        View::Reader => reader::render(f, app, chunks[0]),
        View::Bookmarks => bookmark_list::render(f, app, chunks[0]),
        View::Trending => dashboard::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    // Render help overlay on top of any view when active
    if app.show_help {
        help::render(f, app);
    }
}

/// Render the feed view: search bar, category strip, article list and the
/// chat or trending sidebar.
fn render_feed(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Length(3), // Category strip
            Constraint::Min(0),    // Articles + sidebar
        ])
        .split(area);

    search_bar::render(f, app, rows[0]);
    categories::render(f, app, rows[1]);

    let show_sidebar = area.width >= SIDEBAR_MIN_WIDTH || app.chat.is_open();
    let (list_area, side_area) = if show_sidebar {
        let split = if area.width >= SIDEBAR_MIN_WIDTH { 65 } else { 50 };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(split),
                Constraint::Percentage(100 - split),
            ])
            .split(rows[2]);
        (cols[0], Some(cols[1]))
    } else {
        (rows[2], None)
    };

    render_article_column(f, app, list_area);

    if let Some(side) = side_area {
        if app.chat.is_open() {
            chat_panel::render(f, app, side);
        } else {
            sidebar::render(f, app, side);
        }
    }
}

/// The article list, with the retry panel above it while the last request
/// failed. The list keeps showing whatever loaded before.
fn render_article_column(f: &mut Frame, app: &mut App, area: Rect) {
    let notice = app.feed.controller().error().cloned();
    match notice {
        Some(notice) => {
            let height = error_panel::height(&notice).min(area.height / 2);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(height), Constraint::Min(0)])
                .split(area);
            error_panel::render(f, app, parts[0], &notice, true);
            articles::render(f, app, parts[1]);
        }
        None => articles::render(f, app, area),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ApiError, ArticlePage, DEFAULT_TIMEOUT};
    use crate::config::Config;
    use crate::session::SessionIdentity;
    use crate::storage::Database;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let api = ApiClient::new("http://localhost:8000", DEFAULT_TIMEOUT).unwrap();
        let session = SessionIdentity::parse("user_abc123def_loyw3v28").unwrap();
        App::new(api, db, session, &Config::default())
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        screen(&terminal)
    }

    #[tokio::test]
    async fn test_too_small_terminal() {
        let mut app = test_app().await;
        let out = draw(&mut app, 40, 8);
        assert!(out.contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_feed_layout_renders_titles_and_records_hit_areas() {
        let mut app = test_app().await;
        let fetch = app.feed.refresh();
        let page: ArticlePage = serde_json::from_value(serde_json::json!({
            "articles": [{"id": 1, "title": "Rust 2.0 announced", "url": "https://e.com/1",
                          "source": "Hacker News", "category": "Tech News"}],
            "total": 1, "page": 1, "page_size": 20, "has_next": false
        }))
        .unwrap();
        app.feed.complete(&fetch, Ok(page), Instant::now());

        let out = draw(&mut app, 120, 30);
        assert!(out.contains("Rust 2.0 announced"));
        assert!(out.contains("Learning"));
        assert!(out.contains("Trending"));
        assert_eq!(app.strip_area.height, 1);
        assert!(app.articles_area.width > 0);
    }

    #[tokio::test]
    async fn test_connection_error_panel_keeps_list() {
        let mut app = test_app().await;
        let fetch = app.feed.refresh();
        app.feed.complete(
            &fetch,
            Err(ApiError::Connection("refused".into())),
            Instant::now(),
        );
        let out = draw(&mut app, 120, 30);
        assert!(out.contains("Connection Error"));
    }

    #[tokio::test]
    async fn test_chat_replaces_sidebar_when_open() {
        let mut app = test_app().await;
        app.chat.open_for(None);
        let out = draw(&mut app, 120, 30);
        assert!(out.contains("AI Chat"));
    }
}
