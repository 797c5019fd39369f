use crate::api::ErrorNotice;
use crate::app::App;
use crate::keybindings::Action as KbAction;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows needed for `notice`: borders, description, hints and the action
/// line.
pub(super) fn height(notice: &ErrorNotice) -> u16 {
    let hints = u16::try_from(notice.hints.len()).unwrap_or(u16::MAX);
    4u16.saturating_add(hints)
}

/// Render an error notice as a bordered panel. With `retry` the action
/// line advertises the retry and dismiss keys.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect, notice: &ErrorNotice, retry: bool) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        notice.description.clone(),
        app.theme.error_text,
    ))];
    for hint in &notice.hints {
        lines.push(Line::from(Span::styled(
            format!("  • {}", hint),
            app.theme.error_hint,
        )));
    }
    if retry {
        let retry_key = app
            .keybindings
            .key_hint(KbAction::Retry)
            .unwrap_or_else(|| "R".to_string());
        let dismiss_key = app
            .keybindings
            .key_hint(KbAction::DismissError)
            .unwrap_or_else(|| "x".to_string());
        lines.push(Line::from(Span::styled(
            format!("[{}] retry  [{}] dismiss", retry_key, dismiss_key),
            app.theme.muted,
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.error_title)
                .title(Span::styled(
                    format!(" {} ", notice.title),
                    app.theme.error_title,
                )),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
