//! Helper functions for UI operations.
//!
//! Everything that starts background work lives here: each helper updates
//! the relevant state machine first, then spawns the network call, which
//! reports back through an [`AppEvent`].

use crate::app::{App, AppEvent, Focus, SummaryState, View, CATEGORY_PREF_KEY};
use crate::api::with_retry;
use crate::bookmarks::{toggle_bookmark, LIST_LIMIT, LIST_SKIP};
use crate::chat::{ChatValidation, HISTORY_LIMIT};
use crate::feed::{PendingFetch, SearchIntent};
use crate::trending::{fetch_detail, fetch_summary, TrendingPart, TIMELINE_INTERVAL_HOURS};
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Error message for articles without URLs
pub(super) const ERR_ARTICLE_NO_URL: &str = "Article has no URL";

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics in spawned tasks would otherwise vanish inside the runtime; this
/// turns them into `Err(message)` so the UI can report them.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `work` and deliver its event, or `TaskPanicked` if it panics.
pub(super) fn spawn_task<F>(
    task: &'static str,
    event_tx: &mpsc::Sender<AppEvent>,
    work: F,
) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Failed to send task result (receiver dropped)");
        }
    })
}

// ============================================================================
// Feed
// ============================================================================

/// Start the network fetch for `fetch`, superseding any earlier one.
pub(super) fn spawn_feed_fetch(app: &mut App, fetch: PendingFetch, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.feed_handle.take() {
        handle.abort();
        tracing::debug!("Aborted superseded feed request");
    }
    let api = app.api.clone();
    let policy = app.retry;
    tracing::debug!(
        page = fetch.request.page(),
        search = fetch.request.is_search(),
        generation = fetch.key.generation,
        "Spawning feed request"
    );
    app.feed_handle = Some(spawn_task("feed_page", event_tx, async move {
        let result = with_retry(policy, || fetch.request.execute(&api)).await;
        AppEvent::FeedPageLoaded { fetch, result }
    }));
}

/// Spawn `fetch` if the store asked for network work.
pub(super) fn dispatch_feed(
    app: &mut App,
    fetch: Option<PendingFetch>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if let Some(fetch) = fetch {
        spawn_feed_fetch(app, fetch, event_tx);
    }
    app.clamp_selections();
    check_selected_bookmark(app, event_tx);
}

/// Apply a settled search input to the feed.
pub(super) fn apply_search_intent(
    app: &mut App,
    intent: SearchIntent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let search = match &intent {
        SearchIntent::Clear => "",
        SearchIntent::Search(q) => q.as_str(),
    };
    let fetch = app.feed.set_search(search, Instant::now());
    app.selected_article = 0;
    app.article_offset = 0;
    dispatch_feed(app, fetch, event_tx);
}

/// Select `category` on the strip and in the feed, and remember it.
pub(super) fn apply_category(app: &mut App, category: &str, event_tx: &mpsc::Sender<AppEvent>) {
    app.strip.select_value(category);
    let now = Instant::now();
    if app.feed.controller().category() == category {
        return;
    }
    let fetch = app.feed.set_category(category, now);
    app.selected_article = 0;
    app.article_offset = 0;
    dispatch_feed(app, fetch, event_tx);
    persist_pref(app, CATEGORY_PREF_KEY, category);
}

/// Load the next page when the server reports more.
pub(super) fn load_more(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(fetch) = app.feed.load_more(Instant::now()) {
        app.set_status("Loading more articles...");
        spawn_feed_fetch(app, fetch, event_tx);
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Open `article` in the reader and fetch its full record.
pub(super) fn open_reader(
    app: &mut App,
    article: crate::api::Article,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if let Some(handle) = app.content_load_handle.take() {
        handle.abort();
    }
    let article_id = article.id;
    let generation = app.enter_reader(article);
    let api = app.api.clone();
    let policy = app.retry;
    app.content_load_handle = Some(spawn_task("article_load", event_tx, async move {
        let result = with_retry(policy, || api.get_article(article_id)).await;
        AppEvent::ArticleLoaded {
            article_id,
            generation,
            result,
        }
    }));
}

/// Ask the AI service for a summary of the focused article.
pub(super) fn request_summary(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(article_id) = app.focused_article().map(|a| a.id) else {
        return;
    };
    if matches!(app.summary, SummaryState::Loading { article_id: id } if id == article_id) {
        return;
    }
    app.summary = SummaryState::Loading { article_id };
    app.reader_cached_line_count = None;
    let api = app.api.clone();
    spawn_task("summarize", event_tx, async move {
        let result = api.summarize_article(article_id).await;
        AppEvent::SummaryLoaded { article_id, result }
    });
}

/// Hand the article link to the system browser after validation.
pub(super) fn open_in_browser(app: &mut App) {
    let Some(url) = app.focused_article().map(|a| a.url.clone()) else {
        return;
    };
    if url.trim().is_empty() {
        app.set_status(ERR_ARTICLE_NO_URL);
        return;
    }
    match validate_url_for_open(&url) {
        Ok(valid) => {
            if let Err(e) = open::that(valid.as_str()) {
                tracing::warn!(error = %e, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opened in browser");
            }
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Refusing to open URL");
            app.set_status(format!("Cannot open URL: {}", e));
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

/// Open (or retarget) the chat panel on the focused article.
pub(super) fn open_chat(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let article = app.focused_article().cloned();
    if let Some(article_id) = app.chat.open_for(article.as_ref()) {
        let api = app.api.clone();
        let policy = app.retry;
        spawn_task("article_topics", event_tx, async move {
            let result = with_retry(policy, || api.article_topics(article_id)).await;
            AppEvent::ArticleTopicsLoaded(result)
        });
    }
    if app.view == View::Feed {
        app.focus = Focus::Chat;
    }
    load_chat_history(app, event_tx);
}

pub(super) fn load_chat_history(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if !app.chat.begin_history_load() {
        return;
    }
    let api = app.api.clone();
    let user = app.session.clone();
    let policy = app.retry;
    spawn_task("chat_history", event_tx, async move {
        let result = with_retry(policy, || api.chat_history(&user, HISTORY_LIMIT)).await;
        AppEvent::ChatHistoryLoaded(result)
    });
}

/// Submit the chat input. Sends are never retried.
pub(super) fn send_chat(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let request = match app.chat.submit(&app.session) {
        Ok(request) => request,
        Err(ChatValidation::Empty) => return,
        Err(ChatValidation::Busy) => {
            app.set_status("Waiting for the previous reply...");
            return;
        }
    };
    let api = app.api.clone();
    app.chat_handle = Some(spawn_task("chat_send", event_tx, async move {
        AppEvent::ChatReplied(api.send_chat(&request).await)
    }));
}

pub(super) fn clear_chat(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let api = app.api.clone();
    let user = app.session.clone();
    spawn_task("chat_clear", event_tx, async move {
        AppEvent::ChatCleared(api.clear_chat_history(&user).await)
    });
}

// ============================================================================
// Bookmarks
// ============================================================================

/// Fetch the bookmark status of the selected article when not cached.
pub(super) fn check_selected_bookmark(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(article_id) = app.focused_article().map(|a| a.id) else {
        return;
    };
    let now = Instant::now();
    if let Some(status) = app.bookmarks.cached_status(article_id, now) {
        app.bookmark_marks.insert(article_id, status);
    }
    if !app.bookmarks.needs_status_check(article_id, now) {
        return;
    }
    let epoch = app.bookmarks.status_epoch(article_id);
    let api = app.api.clone();
    let user = app.session.clone();
    spawn_task("bookmark_status", event_tx, async move {
        let result = api.is_bookmarked(article_id, &user).await;
        AppEvent::BookmarkStatusLoaded {
            article_id,
            epoch,
            result,
        }
    });
}

pub(super) fn toggle_focused_bookmark(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(article_id) = app.focused_article().map(|a| a.id) else {
        return;
    };
    if !app.bookmarks.begin_toggle(article_id) {
        return;
    }
    let api = app.api.clone();
    let user = app.session.clone();
    spawn_task("bookmark_toggle", event_tx, async move {
        let result = toggle_bookmark(&api, &user, article_id).await;
        AppEvent::BookmarkToggled { article_id, result }
    });
}

pub(super) fn load_bookmarks(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if !app.bookmarks.begin_list_load(Instant::now()) {
        app.clamp_selections();
        return;
    }
    let api = app.api.clone();
    let user = app.session.clone();
    let policy = app.retry;
    spawn_task("bookmarks", event_tx, async move {
        let result = with_retry(policy, || api.bookmarks(&user, LIST_SKIP, LIST_LIMIT)).await;
        AppEvent::BookmarksLoaded(result)
    });
}

pub(super) fn remove_selected_bookmark(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(bookmark_id) = app.selected_bookmark().map(|b| b.id) else {
        return;
    };
    let api = app.api.clone();
    let user = app.session.clone();
    spawn_task("bookmark_remove", event_tx, async move {
        let result = api.delete_bookmark(bookmark_id, &user).await;
        AppEvent::BookmarkRemoved {
            bookmark_id,
            result,
        }
    });
}

// ============================================================================
// Trending
// ============================================================================

/// Load a trending section unless a fresh cached copy exists.
pub(super) fn load_trending(
    app: &mut App,
    part: TrendingPart,
    force: bool,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if !app.trending.begin(part, Instant::now(), force) {
        return;
    }
    let api = app.api.clone();
    let hours = app.trending.hours();
    let policy = app.retry;
    tracing::debug!(?part, hours, interval = TIMELINE_INTERVAL_HOURS, "Loading trending data");
    match part {
        TrendingPart::Summary => {
            spawn_task("trending", event_tx, async move {
                let result = with_retry(policy, || fetch_summary(&api, hours)).await;
                AppEvent::TrendingLoaded(result)
            });
        }
        TrendingPart::Detail => {
            spawn_task("trending_detail", event_tx, async move {
                let result = with_retry(policy, || fetch_detail(&api, hours)).await;
                AppEvent::TrendingDetailLoaded(result)
            });
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Write a preference to the local state store in the background.
pub(super) fn persist_pref(app: &App, key: &'static str, value: &str) {
    let db = app.db.clone();
    let value = value.to_string();
    tokio::spawn(async move {
        if let Err(e) = db.set_value(key, &value).await {
            tracing::warn!(key, error = %e, "Failed to persist preference");
        }
    });
}
