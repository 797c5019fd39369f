//! Application event handling.
//!
//! Applies the results of background tasks to application state. Every
//! handler is synchronous; follow-up work (history re-fetch after a chat
//! reply, status checks after a page lands) is spawned through the helpers.

use crate::api::ErrorNotice;
use crate::app::{App, AppEvent, ContentState, SummaryState, View};
use crate::feed::ApplyOutcome;
use std::time::Instant;
use tokio::sync::mpsc;

use super::helpers::{check_selected_bookmark, load_chat_history};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    let now = Instant::now();
    match event {
        AppEvent::FeedPageLoaded { fetch, result } => {
            let page = fetch.request.page();
            match app.feed.complete(&fetch, result, now) {
                ApplyOutcome::Replaced => {
                    app.clamp_selections();
                    check_selected_bookmark(app, event_tx);
                }
                ApplyOutcome::Appended => {
                    tracing::debug!(page, "Appended feed page");
                }
                ApplyOutcome::Stale => {}
                ApplyOutcome::Failed => {
                    if let Some(notice) = app.feed.controller().error() {
                        let msg = format!("{}: {}", notice.title, notice.description);
                        app.set_status(msg);
                    }
                }
            }
        }

        AppEvent::ArticleLoaded {
            article_id,
            generation,
            result,
        } => {
            if generation != app.content_load_generation || app.view != View::Reader {
                tracing::debug!(
                    article_id,
                    generation,
                    current = app.content_load_generation,
                    "Discarding stale article load"
                );
                return;
            }
            app.content_load_handle = None;
            match result {
                Ok(article) => app.show_article_content(article),
                Err(e) => {
                    tracing::warn!(article_id, error = %e, "Failed to load article");
                    // Fall back to whatever the list already had.
                    let fallback = app.reader_article.clone().filter(|a| a.body().is_some());
                    match fallback {
                        Some(article) => {
                            app.show_article_content(article);
                            app.set_status("Showing cached article text (refresh failed)");
                        }
                        None => {
                            app.content_state = ContentState::Failed {
                                article_id,
                                notice: ErrorNotice::from_error(&e, Some("Failed to load article")),
                            };
                        }
                    }
                }
            }
            app.reader_cached_line_count = None;
        }

        AppEvent::ChatHistoryLoaded(result) => match result {
            Ok(turns) => {
                tracing::debug!(turns = turns.len(), "Chat history loaded");
                if app.chat.on_history(turns) {
                    load_chat_history(app, event_tx);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load chat history");
                let notice = ErrorNotice::from_error(&e, Some("Failed to load chat"));
                if app.chat.on_history_failed(notice) {
                    load_chat_history(app, event_tx);
                }
            }
        },

        AppEvent::ChatReplied(result) => {
            app.chat_handle = None;
            match result {
                Ok(reply) => {
                    app.chat.on_sent(reply);
                    load_chat_history(app, event_tx);
                }
                Err(e) => {
                    tracing::warn!(error = %e, status = ?e.status(), "Chat send failed");
                    app.chat.on_send_failed(&e);
                }
            }
        }

        AppEvent::ChatCleared(result) => match result {
            Ok(_) => {
                app.chat.on_cleared();
                app.chat_scroll = 0;
                app.set_status("Chat history cleared");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear chat history");
                app.set_status(format!("Failed to clear chat: {}", e));
            }
        },

        AppEvent::ArticleTopicsLoaded(result) => match result {
            Ok(topics) => app.chat.set_topics(topics.article_id, topics.topics),
            Err(e) => tracing::debug!(error = %e, "Article topics unavailable"),
        },

        AppEvent::SummaryLoaded { article_id, result } => {
            if !matches!(app.summary, SummaryState::Loading { article_id: id } if id == article_id)
            {
                return;
            }
            app.summary = match result {
                Ok(summary) => SummaryState::Ready {
                    article_id,
                    text: summary.summary,
                },
                Err(e) => {
                    tracing::warn!(article_id, error = %e, "Summary request failed");
                    SummaryState::Failed {
                        article_id,
                        message: e.chat_message().to_string(),
                    }
                }
            };
            app.reader_cached_line_count = None;
        }

        AppEvent::BookmarkStatusLoaded {
            article_id,
            epoch,
            result,
        } => match result {
            Ok(bookmarked) => {
                if app.bookmarks.record_status(article_id, epoch, bookmarked, now) {
                    app.bookmark_marks.insert(article_id, bookmarked);
                }
            }
            Err(e) => tracing::debug!(article_id, error = %e, "Bookmark status check failed"),
        },

        AppEvent::BookmarkToggled { article_id, result } => {
            match app.bookmarks.finish_toggle(article_id, result, now) {
                Ok(bookmarked) => {
                    app.bookmark_marks.insert(article_id, bookmarked);
                    app.set_status(if bookmarked {
                        "Bookmarked"
                    } else {
                        "Bookmark removed"
                    });
                    app.clamp_selections();
                }
                Err(notice) => app.set_status(format!("{}: {}", notice.title, notice.description)),
            }
        }

        AppEvent::BookmarksLoaded(result) => {
            match result {
                Ok(list) => {
                    let marks: Vec<i64> = list.iter().map(|b| b.article_id).collect();
                    if app.bookmarks.on_list(list, now) {
                        for article_id in marks {
                            app.bookmark_marks.insert(article_id, true);
                        }
                    }
                }
                Err(e) => app.bookmarks.on_list_failed(&e),
            }
            app.clamp_selections();
        }

        AppEvent::BookmarkRemoved {
            bookmark_id,
            result,
        } => match result {
            Ok(_) => {
                if let Some(article_id) = app
                    .bookmarks
                    .bookmarks()
                    .iter()
                    .find(|b| b.id == bookmark_id)
                    .map(|b| b.article_id)
                {
                    app.bookmark_marks.insert(article_id, false);
                }
                app.bookmarks.on_removed(bookmark_id, now);
                app.clamp_selections();
                app.set_status("Bookmark removed");
            }
            Err(e) => {
                let notice = ErrorNotice::from_error(&e, Some("Bookmark update failed"));
                app.set_status(format!("{}: {}", notice.title, notice.description));
            }
        },

        AppEvent::TrendingLoaded(result) => app.trending.on_summary(result, now),

        AppEvent::TrendingDetailLoaded(result) => app.trending.on_detail(result, now),

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            match task {
                "chat_send" => {
                    app.chat_handle = None;
                    app.chat
                        .on_send_failed(&crate::api::ApiError::Connection(error.clone()));
                }
                "feed_page" => app.feed_handle = None,
                _ => {}
            }
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}
