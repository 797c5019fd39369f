//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and mode.

use crate::app::{App, AppEvent, ContentState, Focus, View, THEME_PREF_KEY};
use crate::feed::SearchIntent;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::trending::TrendingPart;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;
use tokio::sync::mpsc;

use super::helpers::{
    apply_category, apply_search_intent, check_selected_bookmark, clear_chat, dispatch_feed,
    load_bookmarks, load_more, load_trending, open_chat, open_in_browser, open_reader,
    persist_pref, remove_selected_bookmark, request_summary, send_chat, toggle_focused_bookmark,
};
use super::Action;

/// Lines moved by PageDown/PageUp when the viewport size is not known yet.
const DEFAULT_PAGE_LINES: usize = 20;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    // Handle help overlay input first (captures all keys when visible)
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    // Handle search mode input separately
    if app.search_mode {
        return handle_search_input(app, code, modifiers, event_tx);
    }

    match app.view {
        View::Feed if app.focus == Focus::Chat => handle_chat_input(app, code, modifiers, event_tx),
        View::Feed => handle_feed_input(app, code, modifiers, event_tx),
        View::Reader => handle_reader_input(app, code, modifiers, event_tx),
        View::Bookmarks => handle_bookmarks_input(app, code, modifiers, event_tx),
        View::Trending => handle_trending_input(app, code, modifiers, event_tx),
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

// ============================================================================
// Actions shared across views
// ============================================================================

/// Handle an action that means the same thing in every view.
///
/// Returns `None` when the action is not a shared one.
fn handle_common_action(
    app: &mut App,
    action: KbAction,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Option<Action> {
    match action {
        KbAction::Quit => return Some(Action::Quit),
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            persist_pref(app, THEME_PREF_KEY, app.theme_variant.key());
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ToggleBookmark => toggle_focused_bookmark(app, event_tx),
        KbAction::OpenInBrowser => open_in_browser(app),
        KbAction::ViewBookmarks => show_bookmarks(app, event_tx),
        KbAction::ViewTrending => show_trending(app, event_tx),
        _ => return None,
    }
    Some(Action::Continue)
}

fn show_bookmarks(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.view = View::Bookmarks;
    app.selected_bookmark = 0;
    load_bookmarks(app, event_tx);
}

fn show_trending(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.view = View::Trending;
    app.scroll_offset = 0;
    load_trending(app, TrendingPart::Summary, false, event_tx);
    load_trending(app, TrendingPart::Detail, false, event_tx);
}

// ============================================================================
// Feed view
// ============================================================================

/// Handle input in the feed view (strip, article list and sidebar).
fn handle_feed_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let action = app.keybindings.action_for_key(code, modifiers, app.context());
    let Some(action) = action else {
        return Ok(Action::Continue);
    };
    if let Some(result) = handle_common_action(app, action, event_tx) {
        return Ok(result);
    }

    match action {
        KbAction::Back => handle_feed_back(app, event_tx),
        KbAction::NavDown => match app.focus {
            Focus::Categories => step_category(app, true, event_tx),
            Focus::Articles => {
                if app.nav_down() {
                    check_selected_bookmark(app, event_tx);
                } else if app.at_list_end() && app.feed.controller().can_load_more() {
                    load_more(app, event_tx);
                }
            }
            Focus::Chat => app.chat_scroll = app.chat_scroll.saturating_add(1),
        },
        KbAction::NavUp => match app.focus {
            Focus::Categories => step_category(app, false, event_tx),
            Focus::Articles => {
                if app.nav_up() {
                    check_selected_bookmark(app, event_tx);
                }
            }
            Focus::Chat => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        },
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::Select => {
            if app.focus == Focus::Categories {
                app.focus = Focus::Articles;
            } else if let Some(article) = app.selected_article().cloned() {
                open_reader(app, article, event_tx);
            }
        }
        KbAction::EnterSearch => {
            app.search_mode = true;
            app.search_input = app.feed.controller().search().to_string();
            app.debouncer.sync(app.feed.controller().search());
        }
        KbAction::NextCategory => step_category(app, true, event_tx),
        KbAction::PrevCategory => step_category(app, false, event_tx),
        KbAction::LoadMore => {
            if app.feed.controller().can_load_more() {
                load_more(app, event_tx);
            } else if !app.feed.controller().has_next() && !app.articles().is_empty() {
                app.set_status("No more articles");
            }
        }
        KbAction::Refresh => {
            let fetch = app.feed.refresh();
            dispatch_feed(app, Some(fetch), event_tx);
            load_trending(app, TrendingPart::Summary, true, event_tx);
            app.set_status("Refreshing...");
        }
        KbAction::Retry => {
            let fetch = app.feed.retry();
            dispatch_feed(app, fetch, event_tx);
            if app.trending.error(TrendingPart::Summary).is_some() {
                load_trending(app, TrendingPart::Summary, true, event_tx);
            }
        }
        KbAction::DismissError => {
            app.feed.dismiss_error();
            app.chat.dismiss_error();
        }
        KbAction::OpenChat => {
            if app.chat.is_open() && app.chat.article().map(|a| a.id) == app.selected_article().map(|a| a.id) {
                app.chat.close();
                if app.focus == Focus::Chat {
                    app.focus = Focus::Articles;
                }
            } else {
                open_chat(app, event_tx);
            }
        }
        KbAction::Summarize => {
            if let Some(article) = app.selected_article().cloned() {
                open_reader(app, article, event_tx);
                request_summary(app, event_tx);
            }
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Esc in the feed view peels back one layer: error, focus, search, chat.
fn handle_feed_back(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.feed.controller().error().is_some() {
        app.feed.dismiss_error();
    } else if app.focus != Focus::Articles {
        app.focus = Focus::Articles;
    } else if !app.feed.controller().search().is_empty() {
        app.search_input.clear();
        app.debouncer.sync("");
        apply_search_intent(app, SearchIntent::Clear, event_tx);
    } else if app.chat.is_open() {
        app.chat.close();
    }
}

fn step_category(app: &mut App, forward: bool, event_tx: &mpsc::Sender<AppEvent>) {
    let next = if forward {
        app.strip.next()
    } else {
        app.strip.prev()
    };
    if let Some(category) = next {
        apply_category(app, &category, event_tx);
    }
}

// ============================================================================
// Chat input
// ============================================================================

/// Handle input while the chat panel has focus.
///
/// Printable characters go to the message input; bound chat actions are
/// looked up in the Chat context only, everything else falls through to
/// the feed handler (Tab, arrows, Esc).
fn handle_chat_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match app.keybindings.context_action(code, modifiers, KbContext::Chat) {
        Some(KbAction::SendMessage) => send_chat(app, event_tx),
        Some(KbAction::ClearChat) => clear_chat(app, event_tx),
        Some(KbAction::InsertSuggestion) => {
            let suggestions = app.chat.suggestions();
            if suggestions.is_empty() {
                return Ok(Action::Continue);
            }
            let next = suggestions
                .iter()
                .position(|s| *s == app.chat.input())
                .map_or(0, |i| (i + 1) % suggestions.len());
            app.chat.apply_suggestion(next);
        }
        Some(KbAction::DismissError) => app.chat.dismiss_error(),
        Some(KbAction::Back) => app.focus = Focus::Articles,
        Some(_) => {}
        None => match code {
            KeyCode::Char(c)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                app.chat.push_char(c);
            }
            KeyCode::Backspace => app.chat.backspace(),
            _ => return handle_feed_input(app, code, modifiers, event_tx),
        },
    }
    Ok(Action::Continue)
}

// ============================================================================
// Search input
// ============================================================================

/// Handle input while the search bar is active.
///
/// Keystrokes only arm the debouncer; the query is applied by the tick
/// once typing settles, or immediately on Enter.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match app.keybindings.context_action(code, modifiers, KbContext::Search) {
        Some(KbAction::ExitSearch) => {
            app.search_mode = false;
            app.debouncer.cancel();
            app.search_input = app.feed.controller().search().to_string();
            return Ok(Action::Continue);
        }
        Some(KbAction::CommitSearch) => {
            app.search_mode = false;
            match app.debouncer.flush() {
                Some(intent) => apply_search_intent(app, intent, event_tx),
                // Too short to search: show the query that is applied.
                None => app.search_input = app.feed.controller().search().to_string(),
            }
            return Ok(Action::Continue);
        }
        _ => {}
    }

    let now = Instant::now();
    match code {
        KeyCode::Backspace => {
            app.search_input.pop();
            app.debouncer.input(&app.search_input, now);
        }
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            // Prevent input beyond max search length
            if app.search_input.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return Ok(Action::Continue);
            }
            app.search_input.push(c);
            app.debouncer.input(&app.search_input, now);
        }
        _ => {}
    }
    Ok(Action::Continue)
}

// ============================================================================
// Reader view
// ============================================================================

pub(super) fn handle_reader_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Reader)
    else {
        return Ok(Action::Continue);
    };
    if let Some(result) = handle_common_action(app, action, event_tx) {
        return Ok(result);
    }

    let page = if app.reader_visible_lines > 0 {
        app.reader_visible_lines
    } else {
        DEFAULT_PAGE_LINES
    };
    match action {
        KbAction::ExitReader | KbAction::Back => app.exit_reader(),
        KbAction::ScrollDown | KbAction::NavDown => app.scroll_reader(1),
        KbAction::ScrollUp | KbAction::NavUp => app.scroll_reader(-1),
        KbAction::PageDown => app.scroll_reader(page as isize),
        KbAction::PageUp => app.scroll_reader(-(page as isize)),
        KbAction::Summarize => request_summary(app, event_tx),
        KbAction::Refresh | KbAction::Retry => {
            if let Some(article) = app.reader_article.clone() {
                if action == KbAction::Refresh
                    || matches!(app.content_state, ContentState::Failed { .. })
                {
                    open_reader(app, article, event_tx);
                }
            }
        }
        KbAction::OpenChat => {
            open_chat(app, event_tx);
            app.exit_reader();
            app.view = View::Feed;
            app.focus = Focus::Chat;
        }
        _ => {}
    }
    Ok(Action::Continue)
}

// ============================================================================
// Bookmarks view
// ============================================================================

fn handle_bookmarks_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Bookmarks)
    else {
        return Ok(Action::Continue);
    };
    if action == KbAction::ViewBookmarks {
        app.view = View::Feed;
        return Ok(Action::Continue);
    }
    if let Some(result) = handle_common_action(app, action, event_tx) {
        return Ok(result);
    }

    match action {
        KbAction::Back => app.view = View::Feed,
        KbAction::NavDown => {
            app.nav_down();
        }
        KbAction::NavUp => {
            app.nav_up();
        }
        KbAction::Select => {
            if let Some(article) = app.selected_bookmark().map(|b| b.article.clone()) {
                open_reader(app, article, event_tx);
            }
        }
        KbAction::RemoveBookmark => remove_selected_bookmark(app, event_tx),
        KbAction::Refresh | KbAction::Retry => {
            app.bookmarks.invalidate_list();
            load_bookmarks(app, event_tx);
        }
        _ => {}
    }
    Ok(Action::Continue)
}

// ============================================================================
// Trending view
// ============================================================================

fn handle_trending_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Trending)
    else {
        return Ok(Action::Continue);
    };
    if action == KbAction::ViewTrending {
        app.view = View::Feed;
        return Ok(Action::Continue);
    }
    if let Some(result) = handle_common_action(app, action, event_tx) {
        return Ok(result);
    }

    match action {
        KbAction::Back => app.view = View::Feed,
        KbAction::NavDown | KbAction::ScrollDown => {
            app.scroll_offset = app.scroll_offset.saturating_add(1);
        }
        KbAction::NavUp | KbAction::ScrollUp => {
            app.scroll_offset = app.scroll_offset.saturating_sub(1);
        }
        KbAction::Refresh | KbAction::Retry => {
            load_trending(app, TrendingPart::Summary, true, event_tx);
            load_trending(app, TrendingPart::Detail, true, event_tx);
        }
        _ => {}
    }
    Ok(Action::Continue)
}
