use crate::api::{ErrorNotice, Sentiment};
use crate::app::App;
use crate::trending::TrendingPart;
use crate::util::{format_date, parse_timestamp};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use super::sidebar::bar_line;

const TIMELINE_HEIGHT: u16 = 6;

/// Render the full trending dashboard: every topic, category, source and
/// sentiment share in a scrollable column, with the article timeline as a
/// sparkline underneath.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let timeline: Vec<u64> = app
        .trending
        .detail()
        .map(|d| d.timeline.iter().map(|p| p.count).collect())
        .unwrap_or_default();
    let show_timeline = !timeline.is_empty() && area.height > TIMELINE_HEIGHT + 4;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if show_timeline { TIMELINE_HEIGHT } else { 0 }),
        ])
        .split(area);

    let width = rows[0].width.saturating_sub(2) as usize;
    let lines = dashboard_lines(app, width);
    let visible = rows[0].height.saturating_sub(2) as usize;
    app.scroll_offset = app.scroll_offset.min(lines.len().saturating_sub(visible));

    let loading = app.trending.is_loading(TrendingPart::Summary)
        || app.trending.is_loading(TrendingPart::Detail);
    let title = if loading {
        format!(" Trending · last {}h {} ", app.trending.hours(), super::render::spinner(app))
    } else {
        format!(" Trending · last {}h ", app.trending.hours())
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.panel_border_focused)
                .title(title),
        )
        .scroll((app.scroll_offset.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, rows[0]);

    if show_timeline {
        render_timeline(f, app, rows[1], &timeline);
    }
}

fn dashboard_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let trending = &app.trending;
    let mut lines: Vec<Line<'static>> = Vec::new();

    match trending.summary() {
        Some(summary) => {
            lines.push(heading(app, "Trending topics"));
            if summary.topics.is_empty() {
                lines.push(Line::from(Span::styled("  No trending topics", theme.muted)));
            }
            let max = summary.topics.iter().map(|t| t.count).max().unwrap_or(0);
            for topic in &summary.topics {
                lines.push(bar_line(app, &topic.topic, topic.count, max, width));
            }
            lines.push(Line::from(""));

            lines.push(heading(app, "Categories"));
            if summary.categories.is_empty() {
                lines.push(Line::from(Span::styled("  No category data", theme.muted)));
            }
            let max = summary.categories.iter().map(|c| c.count).max().unwrap_or(0);
            for category in &summary.categories {
                lines.push(bar_line(app, &category.category, category.count, max, width));
            }
            lines.push(Line::from(""));
        }
        None => section_placeholder(app, TrendingPart::Summary, &mut lines),
    }

    match trending.detail() {
        Some(detail) => {
            lines.push(heading(app, "Sources"));
            if detail.sources.is_empty() {
                lines.push(Line::from(Span::styled("  No source data", theme.muted)));
            }
            let max = detail.sources.iter().map(|s| s.count).max().unwrap_or(0);
            for source in &detail.sources {
                lines.push(bar_line(app, &source.source, source.count, max, width));
            }
            lines.push(Line::from(""));

            lines.push(heading(app, "Sentiment"));
            if detail.sentiment.is_empty() {
                lines.push(Line::from(Span::styled("  No sentiment data", theme.muted)));
            }
            for share in &detail.sentiment {
                let style = sentiment_from_label(&share.sentiment)
                    .map_or(theme.trending_label, |s| theme.sentiment(s));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<10}", share.sentiment), style),
                    Span::styled(format!("{:>5.1}%", share.percentage), theme.trending_bar),
                    Span::styled(format!("  ({} articles)", share.count), theme.muted),
                ]));
            }
        }
        None => section_placeholder(app, TrendingPart::Detail, &mut lines),
    }

    lines
}

fn heading(app: &App, text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, app.theme.reader_heading))
}

/// Loading line or error notice for a section that has no data yet.
fn section_placeholder(app: &App, part: TrendingPart, lines: &mut Vec<Line<'static>>) {
    if let Some(notice) = app.trending.error(part) {
        push_notice(app, notice, lines);
    } else {
        lines.push(Line::from(Span::styled(
            format!("{} Loading...", super::render::spinner(app)),
            app.theme.muted,
        )));
        lines.push(Line::from(""));
    }
}

fn push_notice(app: &App, notice: &ErrorNotice, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(Span::styled(notice.title.clone(), app.theme.error_title)));
    lines.push(Line::from(Span::styled(
        notice.description.clone(),
        app.theme.error_text,
    )));
    let key = app
        .keybindings
        .key_hint(crate::keybindings::Action::Refresh)
        .unwrap_or_else(|| "r".to_string());
    lines.push(Line::from(Span::styled(
        format!("[{}] retry", key),
        app.theme.muted,
    )));
    lines.push(Line::from(""));
}

fn render_timeline(f: &mut Frame, app: &App, area: Rect, counts: &[u64]) {
    let range = app.trending.detail().and_then(|d| {
        let first = d.timeline.first()?;
        let last = d.timeline.last()?;
        Some(format!(
            " Articles over time · {} to {} ",
            format_date(parse_timestamp(&first.timestamp)),
            format_date(parse_timestamp(&last.timestamp))
        ))
    });
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.panel_border)
                .title(range.unwrap_or_else(|| " Articles over time ".to_string())),
        )
        .data(counts)
        .style(app.theme.trending_bar);
    f.render_widget(sparkline, area);
}

fn sentiment_from_label(label: &str) -> Option<Sentiment> {
    match label.trim().to_ascii_lowercase().as_str() {
        "positive" => Some(Sentiment::Positive),
        "negative" => Some(Sentiment::Negative),
        "neutral" => Some(Sentiment::Neutral),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_labels_map_case_insensitively() {
        assert_eq!(sentiment_from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(sentiment_from_label(" negative "), Some(Sentiment::Negative));
        assert_eq!(sentiment_from_label("mixed"), None);
    }
}
