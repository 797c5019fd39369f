use crate::app::{App, ContentState, SummaryState};
use crate::theme::ColorPalette;
use crate::util::{format_relative_time, strip_control_chars};
use chrono::Utc;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::borrow::Cow;

/// Render the article reader view
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    // Viewport size feeds scroll clamping; clamp before drawing so a resize
    // never renders one frame past the end.
    app.reader_visible_lines = area.height.saturating_sub(2) as usize;
    app.reader_viewport_width = area.width.saturating_sub(2) as usize;
    app.clamp_reader_scroll();

    let Some(article) = app.reader_article.as_ref() else {
        let paragraph = Paragraph::new("No article selected")
            .block(Block::default().borders(Borders::ALL).title(" Reader "));
        f.render_widget(paragraph, area);
        return;
    };
    let theme = &app.theme;

    let mut meta: Vec<&str> = Vec::with_capacity(4);
    if let Some(source) = article.source.as_deref() {
        meta.push(source);
    }
    if let Some(author) = article.author.as_deref() {
        meta.push(author);
    }
    if let Some(category) = article.category.as_deref() {
        meta.push(category);
    }
    let age = format_relative_time(article.published(), Utc::now());
    if !age.is_empty() {
        meta.push(&age);
    }

    let mut header = vec![
        Line::from(Span::styled(
            strip_control_chars(&article.title).into_owned(),
            theme.reader_heading,
        )),
        Line::from(Span::styled(meta.join(" • "), theme.reader_metadata)),
        Line::from(""),
    ];

    match &app.summary {
        SummaryState::Idle => {}
        SummaryState::Loading { .. } => {
            header.push(Line::from(Span::styled(
                format!("{} Summarizing...", super::render::spinner(app)),
                theme.muted,
            )));
            header.push(Line::from(""));
        }
        SummaryState::Ready { text, .. } => {
            header.push(Line::from(Span::styled("AI Summary", theme.reader_strong)));
            header.extend(
                text.lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), theme.reader_emphasis))),
            );
            header.push(Line::from(""));
        }
        SummaryState::Failed { message, .. } => {
            header.push(Line::from(Span::styled(
                format!("Summary unavailable: {}", message),
                theme.error_text,
            )));
            header.push(Line::from(""));
        }
    }

    let content_lines: Cow<'_, [Line<'static>]> = match &app.content_state {
        ContentState::Idle => Cow::Owned(vec![Line::from("No content")]),
        ContentState::Loading { .. } => Cow::Owned(vec![Line::from(Span::styled(
            format!("{} Loading article...", super::render::spinner(app)),
            theme.muted,
        ))]),
        ContentState::Loaded { rendered_lines, .. } => Cow::Borrowed(rendered_lines),
        ContentState::Failed { notice, .. } => {
            let mut lines = vec![
                Line::from(Span::styled(notice.title.clone(), theme.error_title)),
                Line::from(Span::styled(notice.description.clone(), theme.error_text)),
                Line::from(""),
            ];
            lines.extend(
                notice
                    .hints
                    .iter()
                    .map(|h| Line::from(Span::styled(format!("  • {}", h), theme.error_hint))),
            );
            Cow::Owned(lines)
        }
    };

    let text = Text::from_iter(header.into_iter().chain(content_lines.iter().cloned()));

    // Paragraph scroll is u16; longer articles stop scrolling at the limit.
    const MAX_SCROLL: usize = u16::MAX as usize;
    let title = if app.bookmark_marks.get(&article.id).copied().unwrap_or(false) {
        " ★ Article "
    } else {
        " Article "
    };
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border)
                .title(title),
        )
        .style(theme.reader_body)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset.min(MAX_SCROLL) as u16, 0));

    f.render_widget(paragraph, area);
}

/// Convert markdown to styled lines in `theme`'s reader styles.
///
/// Returns owned lines so the result can be cached in `ContentState` and
/// rebuilt from the source when the theme changes.
pub fn render_markdown(md: &str, theme: &ColorPalette) -> Vec<Line<'static>> {
    let parser = Parser::new(md);
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(md.lines().count());
    let mut current_spans: Vec<Span<'static>> = Vec::with_capacity(4);
    let mut in_code_block = false;
    let mut in_heading = false;
    let mut in_emphasis = false;
    let mut in_strong = false;
    let mut link_dest: Option<String> = None;
    let mut list_depth: usize = 0;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                in_heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                lines.push(Line::from(""));
                in_heading = false;
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::List(_)) => {
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Item) => {
                current_spans.push(Span::raw(format!(
                    "{}• ",
                    "  ".repeat(list_depth.saturating_sub(1))
                )));
            }
            Event::End(TagEnd::Item) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::Start(Tag::Emphasis) => in_emphasis = true,
            Event::End(TagEnd::Emphasis) => in_emphasis = false,
            Event::Start(Tag::Strong) => in_strong = true,
            Event::End(TagEnd::Strong) => in_strong = false,
            Event::Start(Tag::Link { dest_url, .. }) => {
                link_dest = Some(dest_url.into_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(dest) = link_dest.take() {
                    current_spans.push(Span::styled(format!(" <{}>", dest), theme.reader_metadata));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                current_spans.push(Span::styled(
                    format!("[Image: {}]", dest_url),
                    theme.reader_link,
                ));
            }
            Event::Text(text) => {
                if in_code_block {
                    // Code blocks keep their line structure.
                    for code_line in text.lines() {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", code_line),
                            theme.reader_code_block,
                        )));
                    }
                    continue;
                }
                let style = if in_heading {
                    theme.reader_heading
                } else if link_dest.is_some() {
                    theme.reader_link
                } else if in_strong {
                    theme.reader_strong
                } else if in_emphasis {
                    theme.reader_emphasis
                } else {
                    theme.reader_body
                };
                let style = if in_strong && in_emphasis {
                    style.add_modifier(Modifier::ITALIC)
                } else {
                    style
                };
                current_spans.push(Span::styled(
                    strip_control_chars(&text).into_owned(),
                    style,
                ));
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(code.into_string(), theme.reader_inline_code));
            }
            Event::SoftBreak => {
                current_spans.push(Span::raw(" "));
            }
            Event::HardBreak => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::Rule => {
                lines.push(Line::from(Span::styled("────────", theme.muted)));
                lines.push(Line::from(""));
            }
            _ => {}
        }
    }

    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }

    // Trailing blank separator adds nothing at the end of the article.
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeVariant;
    use pretty_assertions::assert_eq;

    fn palette() -> ColorPalette {
        ThemeVariant::Dark.palette()
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_render_plain_text() {
        let lines = render_markdown("Hello world", &palette());
        assert_eq!(plain(&lines), vec!["Hello world"]);
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let lines = render_markdown("First\n\nSecond", &palette());
        assert_eq!(plain(&lines), vec!["First", "", "Second"]);
    }

    #[test]
    fn test_heading_uses_heading_style() {
        let theme = palette();
        let lines = render_markdown("# Title", &theme);
        assert_eq!(lines[0].spans[0].style, theme.reader_heading);
    }

    #[test]
    fn test_bold_and_inline_code_styles() {
        let theme = palette();
        let lines = render_markdown("Use **bold** and `code`", &theme);
        let spans = &lines[0].spans;
        assert!(spans
            .iter()
            .any(|s| s.content == "bold" && s.style == theme.reader_strong));
        assert!(spans
            .iter()
            .any(|s| s.content == "code" && s.style == theme.reader_inline_code));
    }

    #[test]
    fn test_code_block_keeps_lines() {
        let lines = render_markdown("```\nfn main() {}\nlet x = 1;\n```", &palette());
        assert_eq!(plain(&lines), vec!["  fn main() {}", "  let x = 1;"]);
    }

    #[test]
    fn test_link_shows_destination() {
        let lines = render_markdown("[docs](https://example.com)", &palette());
        assert_eq!(plain(&lines), vec!["docs <https://example.com>"]);
    }

    #[test]
    fn test_list_items_get_bullets() {
        let lines = render_markdown("- one\n- two", &palette());
        assert_eq!(plain(&lines), vec!["• one", "• two"]);
    }

    #[test]
    fn test_render_empty() {
        assert!(render_markdown("", &palette()).is_empty());
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let lines = render_markdown("bad\u{1b}[31m text", &palette());
        assert!(!plain(&lines)[0].contains('\u{1b}'));
    }
}
