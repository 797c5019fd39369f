use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the category strip.
///
/// The strip is one line of chips laid out at the offsets `CategoryStrip`
/// computes, scrolled horizontally by the strip's scroll offset. The inner
/// rect is recorded for mouse hit testing.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    app.strip.set_viewport(area.width.saturating_sub(2));

    let is_focused = app.focus == Focus::Categories;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.panel_border_focused
        } else {
            app.theme.panel_border
        })
        .title(strip_title(app));
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.strip_area = Rect { height: 1, ..inner };

    let selected = app.strip.selected();
    let mut spans: Vec<Span> = Vec::with_capacity(app.strip.options().len() * 2);
    for (i, option) in app.strip.options().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let style = if i == selected {
            app.theme.category_active
        } else {
            app.theme.category_normal
        };
        spans.push(Span::styled(format!(" {} ", option.label), style));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default())
        .scroll((0, app.strip.scroll()));
    f.render_widget(paragraph, app.strip_area);
}

/// Border title with overflow arrows when chips are hidden on either side.
fn strip_title(app: &App) -> String {
    let left = if app.strip.scroll() > 0 { "◀ " } else { "" };
    let right = if app.strip.scroll() < app.strip.max_scroll() {
        " ▶"
    } else {
        ""
    };
    format!(" {}Categories{} ", left, right)
}
