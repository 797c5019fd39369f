use crate::app::App;
use crate::util::{format_date, parse_timestamp, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the saved-articles view.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let list_area = match app.bookmarks.list_error().cloned() {
        Some(notice) => {
            let height = super::error_panel::height(&notice).min(area.height / 2);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(height), Constraint::Min(0)])
                .split(area);
            super::error_panel::render(f, app, parts[0], &notice, true);
            parts[1]
        }
        None => area,
    };

    let available_width = list_area.width.saturating_sub(4) as usize;
    let bookmarks = app.bookmarks.bookmarks();

    let items: Vec<ListItem> = if bookmarks.is_empty() {
        let text = if app.bookmarks.is_list_loading() {
            format!("{} Loading bookmarks...", super::render::spinner(app))
        } else {
            "No bookmarks yet. Press b on an article to save it.".to_string()
        };
        vec![ListItem::new(Line::from(Span::styled(text, app.theme.muted)))]
    } else {
        bookmarks
            .iter()
            .map(|bookmark| {
                let article = &bookmark.article;
                let title = strip_control_chars(&article.title);
                let mut meta = Vec::with_capacity(3);
                if let Some(source) = article.source.as_deref() {
                    meta.push(source.to_string());
                }
                if let Some(category) = article.category.as_deref() {
                    meta.push(category.to_string());
                }
                let saved = format_date(parse_timestamp(&bookmark.created_at));
                if !saved.is_empty() {
                    meta.push(format!("saved {}", saved));
                }
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("★ {}", truncate_to_width(&title, available_width)),
                        app.theme.article_title,
                    )),
                    Line::from(Span::styled(
                        format!("  {}", meta.join(" · ")),
                        app.theme.article_meta,
                    )),
                ])
            })
            .collect()
    };

    let title = if app.bookmarks.is_list_loading() && !bookmarks.is_empty() {
        format!(" Bookmarks ({}) {} ", bookmarks.len(), super::render::spinner(app))
    } else {
        format!(" Bookmarks ({}) ", bookmarks.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.panel_border_focused)
                .title(title),
        )
        .highlight_style(app.theme.article_selected);

    let selected = (!bookmarks.is_empty()).then_some(app.selected_bookmark);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, list_area, &mut state);
}
