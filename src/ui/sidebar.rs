use crate::app::App;
use crate::trending::TrendingPart;
use crate::util::pad_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the trending sidebar next to the article list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let trending = &app.trending;
    if let Some(notice) = trending.error(TrendingPart::Summary) {
        if trending.summary().is_none() {
            let height = super::error_panel::height(notice).min(area.height);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(height), Constraint::Min(0)])
                .split(area);
            super::error_panel::render(f, app, parts[0], notice, true);
            return;
        }
    }

    let title = if trending.is_loading(TrendingPart::Summary) {
        format!(" Trending {} ", super::render::spinner(app))
    } else {
        format!(" Trending · {}h ", trending.hours())
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if trending.summary().is_none() {
        lines.push(Line::from(Span::styled(
            format!("{} Loading trends...", super::render::spinner(app)),
            app.theme.muted,
        )));
    } else {
        lines.push(Line::from(Span::styled("Topics", app.theme.reader_heading)));
        let topics = trending.top_topics();
        if topics.is_empty() {
            lines.push(Line::from(Span::styled("  No trending topics", app.theme.muted)));
        }
        let max = topics.iter().map(|t| t.count).max().unwrap_or(0);
        for topic in topics {
            lines.push(bar_line(app, &topic.topic, topic.count, max, inner_width));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Categories", app.theme.reader_heading)));
        let categories = trending.top_categories();
        if categories.is_empty() {
            lines.push(Line::from(Span::styled("  No category data", app.theme.muted)));
        }
        let max = categories.iter().map(|c| c.count).max().unwrap_or(0);
        for category in categories {
            lines.push(bar_line(
                app,
                &category.category,
                category.count,
                max,
                inner_width,
            ));
        }

        lines.push(Line::from(""));
        let key = app
            .keybindings
            .key_hint(crate::keybindings::Action::ViewTrending)
            .unwrap_or_else(|| "t".to_string());
        lines.push(Line::from(Span::styled(
            format!("[{}] full dashboard", key),
            app.theme.muted,
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.panel_border)
            .title(title),
    );
    f.render_widget(paragraph, area);
}

/// `label ████ count`, with the bar scaled against the largest count.
pub(super) fn bar_line(
    app: &App,
    label: &str,
    count: u64,
    max: u64,
    width: usize,
) -> Line<'static> {
    let label_width = (width / 2).clamp(4, 24);
    let count_text = format!(" {}", count);
    let bar_room = width
        .saturating_sub(label_width + 1 + count_text.len())
        .max(1);
    let scaled = if max == 0 {
        0
    } else {
        ((count as f64 / max as f64) * bar_room as f64).round() as usize
    };
    let filled = scaled.clamp(usize::from(count > 0), bar_room);

    Line::from(vec![
        Span::styled(pad_to_width(label, label_width), app.theme.trending_label),
        Span::raw(" "),
        Span::styled("█".repeat(filled), app.theme.trending_bar),
        Span::styled(count_text, app.theme.muted),
    ])
}
