use crate::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PLACEHOLDER: &str = "Search articles... (press / to type)";

/// Render the search input. Shows the typed text while in search mode,
/// otherwise the applied query or a placeholder.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let inner_width = area.width.saturating_sub(4) as usize;

    let line = if app.search_mode {
        let text = tail_to_width(&app.search_input, inner_width.saturating_sub(1));
        Line::from(vec![
            Span::styled(text, app.theme.search_input),
            Span::styled("_", app.theme.search_input),
        ])
    } else if !app.feed.controller().search().is_empty() {
        Line::from(vec![
            Span::styled(
                truncate_to_width(app.feed.controller().search(), inner_width).into_owned(),
                app.theme.search_input,
            ),
            Span::styled("  (Esc clears)", app.theme.muted),
        ])
    } else {
        Line::from(Span::styled(PLACEHOLDER, app.theme.search_placeholder))
    };

    let title = if app.debouncer.is_pending() {
        " Search (typing...) ".to_string()
    } else if app.feed.controller().is_loading() && !app.feed.controller().search().is_empty() {
        format!(" Search {} ", super::render::spinner(app))
    } else {
        " Search ".to_string()
    };

    let border_style = if app.search_mode {
        app.theme.panel_border_focused
    } else {
        app.theme.panel_border
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}

/// Keep the end of `s` visible so the cursor stays on screen while typing.
fn tail_to_width(s: &str, width: usize) -> String {
    let mut out: Vec<char> = Vec::new();
    let mut used = 0;
    for c in s.chars().rev() {
        let w = crate::util::display_width(c.encode_utf8(&mut [0u8; 4]));
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.into_iter().rev().collect()
}
