//! Mouse handling for the feed view.
//!
//! The category strip gets press/drag/release so drags pan without
//! selecting; the article list takes clicks and wheel scrolling. Hit areas
//! are the rects recorded by the last render.

use crate::app::{App, AppEvent, Focus, View};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::Instant;
use tokio::sync::mpsc;

use super::helpers::{apply_category, check_selected_bookmark, load_more, open_reader};

pub(super) fn handle_mouse(app: &mut App, event: MouseEvent, event_tx: &mpsc::Sender<AppEvent>) {
    if app.view != View::Feed || app.show_help || app.search_mode {
        return;
    }
    let pos = Position::new(event.column, event.row);
    let in_strip = app.strip_area.contains(pos);
    let in_articles = app.articles_area.contains(pos);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) if in_strip => {
            app.strip.pointer_down(strip_x(app.strip_area, event.column));
            app.focus = Focus::Categories;
            app.needs_redraw = true;
        }
        MouseEventKind::Drag(MouseButton::Left) if app.strip.is_dragging() => {
            app.strip.pointer_move(strip_x(app.strip_area, event.column));
            app.needs_redraw = true;
        }
        MouseEventKind::Up(MouseButton::Left) if app.strip.is_dragging() => {
            let now = Instant::now();
            app.strip.pointer_up(now);
            if in_strip {
                if let Some(category) = app.strip.click(strip_x(app.strip_area, event.column), now) {
                    apply_category(app, &category, event_tx);
                }
            }
            app.needs_redraw = true;
        }
        MouseEventKind::Down(MouseButton::Left) if in_articles => {
            app.focus = Focus::Articles;
            let Some(index) = article_row(app, event.row) else {
                return;
            };
            if index == app.selected_article {
                if let Some(article) = app.selected_article().cloned() {
                    open_reader(app, article, event_tx);
                }
            } else {
                app.selected_article = index;
                check_selected_bookmark(app, event_tx);
            }
            app.needs_redraw = true;
        }
        MouseEventKind::ScrollDown if in_articles => {
            if app.nav_down() {
                check_selected_bookmark(app, event_tx);
            } else if app.at_list_end() && app.feed.controller().can_load_more() {
                load_more(app, event_tx);
            }
            app.needs_redraw = true;
        }
        MouseEventKind::ScrollUp if in_articles => {
            if app.nav_up() {
                check_selected_bookmark(app, event_tx);
            }
            app.needs_redraw = true;
        }
        MouseEventKind::ScrollDown if in_strip => {
            if let Some(category) = app.strip.next() {
                apply_category(app, &category, event_tx);
            }
        }
        MouseEventKind::ScrollUp if in_strip => {
            if let Some(category) = app.strip.prev() {
                apply_category(app, &category, event_tx);
            }
        }
        _ => {}
    }
}

/// Column relative to the strip's left edge.
fn strip_x(area: Rect, column: u16) -> u16 {
    column.saturating_sub(area.x)
}

/// Article index under `row`, accounting for the list border and scroll
/// offset. Each article occupies two rows.
fn article_row(app: &App, row: u16) -> Option<usize> {
    let top = app.articles_area.y.saturating_add(1);
    if row < top {
        return None;
    }
    let index = app.article_offset + usize::from(row - top) / super::articles::ROWS_PER_ARTICLE;
    (index < app.articles().len()).then_some(index)
}
