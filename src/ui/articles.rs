use crate::app::{App, Focus};
use crate::util::{display_width, format_relative_time, strip_control_chars, truncate_to_width};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Each article is a title line plus a metadata line.
pub(super) const ROWS_PER_ARTICLE: usize = 2;

/// Render the article list panel.
///
/// Records the panel rect for mouse hit testing and writes the list's
/// scroll offset back so clicks map to the right row.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    app.articles_area = area;
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Articles;
    let controller = app.feed.controller();
    let now = Utc::now();
    let available_width = area.width.saturating_sub(2) as usize;

    let mut items: Vec<ListItem> = controller
        .articles()
        .iter()
        .map(|article| {
            let marked = app.bookmark_marks.get(&article.id).copied().unwrap_or(false);
            let marker = if marked { "★ " } else { "  " };

            let title = strip_control_chars(&article.title);
            let title = truncate_to_width(&title, available_width.saturating_sub(2)).into_owned();

            let mut meta: Vec<Span> = Vec::with_capacity(6);
            meta.push(Span::raw("  "));
            if let Some(source) = article.source.as_deref() {
                meta.push(Span::styled(
                    truncate_to_width(source, 24).into_owned(),
                    app.theme.article_meta,
                ));
            }
            if let Some(category) = article.category.as_deref() {
                meta.push(Span::styled(format!(" · {}", category), app.theme.article_category));
            }
            let age = format_relative_time(article.published(), now);
            if !age.is_empty() {
                meta.push(Span::styled(format!(" · {}", age), app.theme.article_meta));
            }
            if let Some(sentiment) = article.sentiment {
                meta.push(Span::styled(
                    format!(" · {}", sentiment.as_str()),
                    app.theme.sentiment(sentiment),
                ));
            }

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, app.theme.bookmark_marker),
                    Span::styled(title, app.theme.article_title),
                ]),
                Line::from(meta),
            ])
        })
        .collect();

    if let Some(footer) = footer_line(app, available_width) {
        items.push(ListItem::new(footer));
    }

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            empty_message(app),
            app.theme.muted,
        ))));
    }

    let border_style = if is_focused {
        app.theme.panel_border_focused
    } else {
        app.theme.panel_border
    };

    let title = panel_title(app);
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(app.theme.article_selected);

    let selected = (!app.articles().is_empty()).then_some(app.selected_article);
    let mut state = ListState::default()
        .with_selected(selected)
        .with_offset(app.article_offset);
    f.render_stateful_widget(list, area, &mut state);
    app.article_offset = state.offset();
}

fn panel_title(app: &App) -> String {
    let controller = app.feed.controller();
    let scope = if controller.search().is_empty() {
        "Articles".to_string()
    } else {
        format!("Results for \"{}\"", truncate_to_width(controller.search(), 30))
    };
    let category = app
        .strip
        .options()
        .get(app.strip.selected())
        .map_or("All", |o| o.label.as_str());
    if controller.is_loading() && !controller.is_loading_more() {
        format!(" {} · {} {} ", scope, category, super::render::spinner(app))
    } else if controller.total() > 0 {
        format!(
            " {} · {} ({} of {}) ",
            scope,
            category,
            controller.articles().len(),
            controller.total()
        )
    } else {
        format!(" {} · {} ", scope, category)
    }
}

/// Load-more row under the last article while the server reports more.
fn footer_line(app: &App, width: usize) -> Option<Line<'static>> {
    let controller = app.feed.controller();
    if controller.articles().is_empty() || !controller.has_next() {
        return None;
    }
    let text = if controller.is_loading_more() {
        format!("{} Loading more...", super::render::spinner(app))
    } else {
        let key = app
            .keybindings
            .key_hint(crate::keybindings::Action::LoadMore)
            .unwrap_or_else(|| "n".to_string());
        format!("── [{}] Load more ──", key)
    };
    let pad = width.saturating_sub(display_width(&text)) / 2;
    Some(Line::from(Span::styled(
        format!("{}{}", " ".repeat(pad), text),
        app.theme.muted,
    )))
}

fn empty_message(app: &App) -> String {
    let controller = app.feed.controller();
    if controller.is_loading() {
        format!("{} Loading articles...", super::render::spinner(app))
    } else if controller.error().is_some() {
        "Nothing to show yet".to_string()
    } else if !controller.search().is_empty() {
        format!("No articles found for \"{}\"", controller.search())
    } else {
        "No articles".to_string()
    }
}
