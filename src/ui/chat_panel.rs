use crate::app::{wrapped_line_count, App, Focus};
use crate::keybindings::Action as KbAction;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the AI chat panel: context line, transcript and input box.
///
/// `chat_scroll` is clamped against the wrapped transcript here, which also
/// resolves the scroll-to-latest sentinel set by the tick.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Chat;
    let inner_width = area.width.saturating_sub(2) as usize;

    let title = match app.chat.article() {
        Some(article) => format!(
            " AI Chat · {} ",
            truncate_to_width(
                &strip_control_chars(&article.title),
                inner_width.saturating_sub(12)
            )
        ),
        None => " AI Chat ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.panel_border_focused
        } else {
            app.theme.panel_border
        })
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let topics_height = u16::from(!app.chat.topics().is_empty());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(topics_height),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(inner);

    if topics_height > 0 {
        let mut spans = vec![Span::styled("Topics: ", app.theme.muted)];
        for (i, topic) in app.chat.topics().iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!("#{}", topic), app.theme.chat_topic));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), rows[0]);
    }

    let lines = transcript_lines(app);
    let width = rows[1].width as usize;
    let visible = rows[1].height as usize;
    let total: usize = lines.iter().map(|l| wrapped_line_count(l, width)).sum();
    app.chat_visible_lines = visible;
    app.chat_scroll = app.chat_scroll.min(total.saturating_sub(visible));

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(transcript, rows[1]);

    render_input(f, app, rows[2]);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let chat = &app.chat;
    let mut lines: Vec<Line<'static>> = Vec::new();

    for turn in chat.transcript() {
        lines.push(Line::from(vec![
            Span::styled("You: ", theme.chat_user),
            Span::raw(strip_control_chars(&turn.message).into_owned()),
        ]));
        let mut response = turn.response.lines();
        let first = response.next().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("AI: ", theme.chat_assistant),
            Span::raw(strip_control_chars(first).into_owned()),
        ]));
        lines.extend(response.map(|l| Line::from(strip_control_chars(l).into_owned())));
        lines.push(Line::from(""));
    }

    if let Some(pending) = chat.pending() {
        lines.push(Line::from(vec![
            Span::styled("You: ", theme.chat_user),
            Span::raw(strip_control_chars(pending).into_owned()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("{} AI is thinking...", super::render::spinner(app)),
            theme.chat_pending,
        )));
    }

    if chat.transcript().is_empty() && chat.pending().is_none() {
        if chat.is_history_loading() {
            lines.push(Line::from(Span::styled(
                format!("{} Loading history...", super::render::spinner(app)),
                theme.muted,
            )));
        } else if let Some(notice) = chat.history_error() {
            lines.push(Line::from(Span::styled(notice.title.clone(), theme.error_title)));
            lines.push(Line::from(Span::styled(
                notice.description.clone(),
                theme.error_text,
            )));
        } else if chat.suggestions().is_empty() {
            lines.push(Line::from(Span::styled(
                "Ask anything about tech news.",
                theme.muted,
            )));
        } else {
            lines.push(Line::from(Span::styled("Try asking:", theme.muted)));
            for prompt in chat.suggestions() {
                lines.push(Line::from(Span::styled(
                    format!("  › {}", prompt),
                    theme.chat_suggestion,
                )));
            }
            let key = app
                .keybindings
                .key_hint(KbAction::InsertSuggestion)
                .unwrap_or_else(|| "Ctrl+p".to_string());
            lines.push(Line::from(Span::styled(
                format!("  [{}] insert a suggestion", key),
                theme.muted,
            )));
        }
    }

    if let Some(err) = chat.send_error() {
        let key = app
            .keybindings
            .key_hint(KbAction::DismissError)
            .unwrap_or_else(|| "x".to_string());
        lines.push(Line::from(vec![
            Span::styled(format!("⚠ {}", err), theme.error_text),
            Span::styled(format!("  [{}] dismiss", key), theme.muted),
        ]));
    }

    lines
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Chat;
    let width = area.width.saturating_sub(3) as usize;
    let input = app.chat.input();
    let line = if input.is_empty() && !is_focused {
        Line::from(Span::styled(app.chat.placeholder(), app.theme.search_placeholder))
    } else if input.is_empty() {
        Line::from(vec![
            Span::styled(app.chat.placeholder(), app.theme.search_placeholder),
            Span::styled("_", app.theme.search_input),
        ])
    } else {
        // Keep the end of the input in view.
        let skip = input.chars().count().saturating_sub(width);
        let visible: String = input.chars().skip(skip).collect();
        let mut spans = vec![Span::styled(visible, app.theme.search_input)];
        if is_focused {
            spans.push(Span::styled("_", app.theme.search_input));
        }
        Line::from(spans)
    };

    let title = if app.chat.is_sending() {
        format!(" Message {} ", super::render::spinner(app))
    } else {
        " Message ".to_string()
    };
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if is_focused {
                app.theme.panel_border_focused
            } else {
                app.theme.panel_border
            })
            .title(title),
    );
    f.render_widget(paragraph, area);
}
